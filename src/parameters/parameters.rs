use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use toml::{Table, Value};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Error deserializing parameters")]
    Deserialize(#[from] toml::de::Error),

    #[error("Parameter toml does not have the right structure (error in '{0}')")]
    BadToml(String),

    #[error("Element '{path}' not found")]
    NotFound { path: String },

    #[error("Cannot cast parameter '{path}' to {dtype}")]
    BadCast { path: String, dtype: String },

    #[error("Parameter '{path}' has {found} elements, expected {expected}")]
    BadLength {
        path: String,
        found: usize,
        expected: usize,
    },

    #[error("Element '{path}' is not a parameter")]
    NotAParameter { path: String },

    #[error("Element '{path}' is not a map")]
    NotAMap { path: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ParameterValue {
    #[serde(rename = "float")]
    Float { val: f64 },
    #[serde(rename = "str")]
    String { val: String },

    #[serde(rename = "float[]")]
    FloatArray { val: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    path: String,
    value: ParameterValue,
}

impl Parameter {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value_float(&self) -> Result<f64, Error> {
        if let ParameterValue::Float { val } = self.value {
            Ok(val)
        } else {
            Err(self.bad_cast("float"))
        }
    }

    pub fn value_string(&self) -> Result<&str, Error> {
        if let ParameterValue::String { val } = &self.value {
            Ok(val)
        } else {
            Err(self.bad_cast("str"))
        }
    }

    pub fn value_float_arr(&self) -> Result<&[f64], Error> {
        if let ParameterValue::FloatArray { val } = &self.value {
            Ok(val)
        } else {
            Err(self.bad_cast("float[]"))
        }
    }

    /// Float array with a length known at compile time, e.g. a weighting diagonal
    pub fn value_float_vec<const N: usize>(&self) -> Result<[f64; N], Error> {
        let arr = self.value_float_arr()?;

        arr.try_into().map_err(|_| Error::BadLength {
            path: self.path.clone(),
            found: arr.len(),
            expected: N,
        })
    }

    fn bad_cast(&self, dtype: &str) -> Error {
        Error::BadCast {
            path: self.path.clone(),
            dtype: dtype.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterMap {
    path: String,
    map: BTreeMap<String, ParameterTree>,
}

impl ParameterMap {
    pub fn contains(&self, rel_path: &str) -> bool {
        self.get(rel_path).is_ok()
    }

    pub fn get(&self, rel_path: &str) -> Result<&ParameterTree, Error> {
        let not_found = || Error::NotFound {
            path: append_path(&self.path, rel_path),
        };

        let mut parts = rel_path.split('.');

        let mut elem = parts
            .next()
            .and_then(|first| self.map.get(first))
            .ok_or_else(not_found)?;

        for part in parts {
            match elem {
                ParameterTree::Node(n) => {
                    elem = n.map.get(part).ok_or_else(not_found)?;
                }
                ParameterTree::Leaf(_) => return Err(not_found()),
            }
        }

        Ok(elem)
    }

    pub fn get_param(&self, rel_path: &str) -> Result<&Parameter, Error> {
        self.get(rel_path)?.as_param()
    }

    pub fn get_map(&self, rel_path: &str) -> Result<&ParameterMap, Error> {
        self.get(rel_path)?.as_map()
    }

    /// Looks up an optional float, falling back to `default` when the leaf is missing.
    /// A leaf that exists but has the wrong type is still an error.
    pub fn float_or(&self, rel_path: &str, default: f64) -> Result<f64, Error> {
        match self.get(rel_path) {
            Ok(tree) => tree.as_param()?.value_float(),
            Err(Error::NotFound { .. }) => Ok(default),
            Err(e) => Err(e),
        }
    }

    pub fn float_vec_or<const N: usize>(
        &self,
        rel_path: &str,
        default: [f64; N],
    ) -> Result<[f64; N], Error> {
        match self.get(rel_path) {
            Ok(tree) => tree.as_param()?.value_float_vec::<N>(),
            Err(Error::NotFound { .. }) => Ok(default),
            Err(e) => Err(e),
        }
    }

    pub fn string_or(&self, rel_path: &str, default: &str) -> Result<String, Error> {
        match self.get(rel_path) {
            Ok(tree) => Ok(tree.as_param()?.value_string()?.to_string()),
            Err(Error::NotFound { .. }) => Ok(default.to_string()),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterTree {
    Node(ParameterMap),
    Leaf(Parameter),
}

impl Default for ParameterTree {
    fn default() -> Self {
        ParameterTree::Node(ParameterMap::default())
    }
}

impl ParameterTree {
    fn as_param(&self) -> Result<&Parameter, Error> {
        match self {
            Self::Leaf(p) => Ok(p),
            Self::Node(m) => Err(Error::NotAParameter {
                path: m.path.clone(),
            }),
        }
    }

    fn as_map(&self) -> Result<&ParameterMap, Error> {
        match self {
            Self::Node(m) => Ok(m),
            Self::Leaf(p) => Err(Error::NotAMap {
                path: p.path.clone(),
            }),
        }
    }
}

pub fn parse_string(toml_str: &str) -> Result<ParameterMap, Error> {
    let table = toml::from_str::<Table>(toml_str)?;

    parse_table(table)
}

pub fn parse_table(table: Table) -> Result<ParameterMap, Error> {
    parse_table_recursive(table, String::new())
}

fn parse_table_recursive(table: Table, root: String) -> Result<ParameterMap, Error> {
    let mut nodes = BTreeMap::new();

    for (key, val) in table.into_iter() {
        let path = append_path(root.as_str(), key.as_str());
        match val {
            Value::Table(val) => {
                if let Ok(value) = val.clone().try_into::<ParameterValue>() {
                    let param = Parameter { path, value };
                    nodes.insert(key, ParameterTree::Leaf(param));
                } else if val.contains_key("type") {
                    // Looks like a leaf, but the value does not match the declared type
                    return Err(Error::BadToml(path));
                } else {
                    nodes.insert(key, ParameterTree::Node(parse_table_recursive(val, path)?));
                }
            }
            _ => {
                return Err(Error::BadToml(path));
            }
        }
    }

    Ok(ParameterMap {
        path: root,
        map: nodes,
    })
}

fn append_path(root: &str, key: &str) -> String {
    if root.is_empty() {
        key.to_string()
    } else {
        format!("{root}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn leaf(path: &str, value: ParameterValue) -> ParameterTree {
        ParameterTree::Leaf(Parameter {
            path: path.to_string(),
            value,
        })
    }

    #[test]
    fn test_empty() {
        assert_eq!(parse_string(""), Ok(ParameterMap::default()))
    }

    #[test]
    fn test_float_accepts_integers() {
        let parsed = parse_string("mass = { val = 1, type = \"float\" }").unwrap();

        assert_eq!(parsed.get_param("mass").unwrap().value_float(), Ok(1.0));
    }

    #[test]
    fn test_bad_type_is_rejected() {
        assert_eq!(
            parse_string("mass = { val = true, type = \"float\" }"),
            Err(Error::BadToml("mass".to_string()))
        );
        assert_eq!(
            parse_string("mass = { val = 1.0, type = \"badtype\" }"),
            Err(Error::BadToml("mass".to_string()))
        );
        assert_eq!(
            parse_string("mass = 1.0"),
            Err(Error::BadToml("mass".to_string()))
        );
    }

    #[test]
    fn test_good_structure() {
        let str = "
        [vehicle]
        mass = { val = 1.5, type = \"float\" }

        [weights]
        preset = { val = \"smooth\", type = \"str\" }
        r_diag = { val = [1.0, 2.0, 3, 4.0], type = \"float[]\" }
        ";

        let parsed = parse_string(str).unwrap();

        let expected = ParameterMap {
            path: String::new(),
            map: BTreeMap::from_iter(vec![
                (
                    "vehicle".to_string(),
                    ParameterTree::Node(ParameterMap {
                        path: "vehicle".to_string(),
                        map: BTreeMap::from_iter(vec![(
                            "mass".to_string(),
                            leaf("vehicle.mass", ParameterValue::Float { val: 1.5 }),
                        )]),
                    }),
                ),
                (
                    "weights".to_string(),
                    ParameterTree::Node(ParameterMap {
                        path: "weights".to_string(),
                        map: BTreeMap::from_iter(vec![
                            (
                                "preset".to_string(),
                                leaf(
                                    "weights.preset",
                                    ParameterValue::String {
                                        val: "smooth".to_string(),
                                    },
                                ),
                            ),
                            (
                                "r_diag".to_string(),
                                leaf(
                                    "weights.r_diag",
                                    ParameterValue::FloatArray {
                                        val: vec![1.0, 2.0, 3.0, 4.0],
                                    },
                                ),
                            ),
                        ]),
                    }),
                ),
            ]),
        };

        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_lookup_helpers() {
        let params = parse_string(
            "
            [sim]
            dt = { val = 0.02, type = \"float\" }
            q = { val = [1.0, 2.0], type = \"float[]\" }
            ",
        )
        .unwrap();

        assert_eq!(params.float_or("sim.dt", 0.01), Ok(0.02));
        assert_eq!(params.float_or("sim.time", 15.0), Ok(15.0));
        assert_eq!(params.float_or("missing.deeply.nested", 3.0), Ok(3.0));
        assert_eq!(params.float_vec_or::<2>("sim.q", [0.0; 2]), Ok([1.0, 2.0]));
        assert_eq!(
            params.float_vec_or::<3>("sim.q", [0.0; 3]),
            Err(Error::BadLength {
                path: "sim.q".to_string(),
                found: 2,
                expected: 3
            })
        );
        assert_eq!(
            params.float_or("sim.q", 0.0),
            Err(Error::BadCast {
                path: "sim.q".to_string(),
                dtype: "float".to_string()
            })
        );
        assert!(params.contains("sim"));
        assert!(params.get_map("sim").is_ok());
        assert_eq!(
            params.get_map("sim.dt"),
            Err(Error::NotAMap {
                path: "sim.dt".to_string()
            })
        );
    }
}
