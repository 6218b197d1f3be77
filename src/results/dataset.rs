use serde::{Deserialize, Deserializer};
use thiserror::Error;

use super::vectors::{CONTROL_DIM, ControlVector, ErrorVector, GainMatrix, STATE_DIM, StateVector};

/// Reasons why a simulation payload cannot be accepted as a [`SimulationResult`]
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Violation {
    #[error("Successful response without a result payload")]
    MissingResult,

    #[error("Result payload has the wrong structure: {0}")]
    Malformed(String),

    #[error("Result contains no samples")]
    Empty,

    #[error("Sequence '{name}' has {len} samples, but 'time' has {expected}")]
    LengthMismatch {
        name: &'static str,
        len: usize,
        expected: usize,
    },

    #[error("Row {index} of '{name}' has {width} elements, expected {expected}")]
    BadWidth {
        name: &'static str,
        index: usize,
        width: usize,
        expected: usize,
    },

    #[error("Non-finite value in '{name}' at row {index}")]
    NonFinite { name: &'static str, index: usize },

    #[error("Time is not strictly increasing at sample {index}")]
    NonMonotonicTime { index: usize },

    #[error("Gain matrix has the wrong shape (expected 4x12)")]
    BadGainShape,
}

/// Result payload exactly as the simulation service sends it
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawSimulationResult {
    #[serde(deserialize_with = "floats")]
    pub time: Vec<f64>,
    #[serde(deserialize_with = "float_rows")]
    pub states: Vec<Vec<f64>>,
    #[serde(deserialize_with = "float_rows")]
    pub inputs: Vec<Vec<f64>>,
    #[serde(deserialize_with = "float_rows")]
    pub error: Vec<Vec<f64>>,

    #[serde(rename = "K", default, deserialize_with = "optional_float_rows")]
    pub gain: Option<Vec<Vec<f64>>>,
}

/// A number as it appears in a result payload. Non-finite values are carried
/// as the strings `"NaN"`, `"Infinity"` and `"-Infinity"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireFloat {
    Number(f64),
    Token(String),
}

impl WireFloat {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            WireFloat::Number(v) => Ok(v),
            WireFloat::Token(token) => match token.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                _ => Err(E::custom(format!("expected a number, found \"{token}\""))),
            },
        }
    }
}

fn floats<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<f64>, D::Error> {
    Vec::<WireFloat>::deserialize(de)?
        .into_iter()
        .map(WireFloat::into_f64)
        .collect()
}

fn float_rows<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Vec<f64>>, D::Error> {
    Vec::<Vec<WireFloat>>::deserialize(de)?
        .into_iter()
        .map(|row| row.into_iter().map(WireFloat::into_f64).collect())
        .collect()
}

fn optional_float_rows<'de, D: Deserializer<'de>>(
    de: D,
) -> Result<Option<Vec<Vec<f64>>>, D::Error> {
    Option::<Vec<Vec<WireFloat>>>::deserialize(de)?
        .map(|rows| {
            rows.into_iter()
                .map(|row| row.into_iter().map(WireFloat::into_f64).collect())
                .collect()
        })
        .transpose()
}

/// One validated simulation run. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    time: Vec<f64>,
    states: Vec<StateVector>,
    inputs: Vec<ControlVector>,
    error: Vec<ErrorVector>,
    gain: Option<GainMatrix>,
}

impl SimulationResult {
    pub fn new(
        time: Vec<f64>,
        states: Vec<StateVector>,
        inputs: Vec<ControlVector>,
        error: Vec<ErrorVector>,
        gain: Option<GainMatrix>,
    ) -> Result<Self, Violation> {
        let n = time.len();
        if n == 0 {
            return Err(Violation::Empty);
        }

        check_len("states", states.len(), n)?;
        check_len("inputs", inputs.len(), n)?;
        check_len("error", error.len(), n)?;

        for (index, t) in time.iter().enumerate() {
            if !t.is_finite() {
                return Err(Violation::NonFinite {
                    name: "time",
                    index,
                });
            }
        }

        if let Some(index) = (1..n).find(|&i| time[i] <= time[i - 1]) {
            return Err(Violation::NonMonotonicTime { index });
        }

        check_finite("states", states.iter().map(|s| s.0.iter().all(|v| v.is_finite())))?;
        check_finite("inputs", inputs.iter().map(|u| u.0.iter().all(|v| v.is_finite())))?;
        check_finite("error", error.iter().map(|e| e.0.iter().all(|v| v.is_finite())))?;

        if let Some(gain) = &gain {
            check_finite("K", gain.0.row_iter().map(|r| r.iter().all(|v| v.is_finite())))?;
        }

        Ok(Self {
            time,
            states,
            inputs,
            error,
            gain,
        })
    }

    /// Number of samples, always at least one
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn states(&self) -> &[StateVector] {
        &self.states
    }

    pub fn inputs(&self) -> &[ControlVector] {
        &self.inputs
    }

    pub fn error(&self) -> &[ErrorVector] {
        &self.error
    }

    pub fn gain(&self) -> Option<&GainMatrix> {
        self.gain.as_ref()
    }
}

impl TryFrom<RawSimulationResult> for SimulationResult {
    type Error = Violation;

    fn try_from(raw: RawSimulationResult) -> Result<Self, Self::Error> {
        let n = raw.time.len();
        if n == 0 {
            return Err(Violation::Empty);
        }

        // Check lengths before widths, so the reported violation names the real problem
        check_len("states", raw.states.len(), n)?;
        check_len("inputs", raw.inputs.len(), n)?;
        check_len("error", raw.error.len(), n)?;

        let states = convert_rows("states", &raw.states, STATE_DIM, StateVector::from_slice)?;
        let inputs = convert_rows("inputs", &raw.inputs, CONTROL_DIM, ControlVector::from_slice)?;
        let error = convert_rows("error", &raw.error, STATE_DIM, ErrorVector::from_slice)?;

        // An empty K is what the service sends when it has no gain to report
        let gain = match raw.gain {
            Some(rows) if !rows.is_empty() => {
                Some(GainMatrix::from_rows(&rows).ok_or(Violation::BadGainShape)?)
            }
            _ => None,
        };

        SimulationResult::new(raw.time, states, inputs, error, gain)
    }
}

fn check_len(name: &'static str, len: usize, expected: usize) -> Result<(), Violation> {
    if len == expected {
        Ok(())
    } else {
        Err(Violation::LengthMismatch {
            name,
            len,
            expected,
        })
    }
}

fn check_finite(
    name: &'static str,
    mut rows: impl Iterator<Item = bool>,
) -> Result<(), Violation> {
    match rows.position(|finite| !finite) {
        Some(index) => Err(Violation::NonFinite { name, index }),
        None => Ok(()),
    }
}

fn convert_rows<T>(
    name: &'static str,
    rows: &[Vec<f64>],
    width: usize,
    convert: fn(&[f64]) -> Option<T>,
) -> Result<Vec<T>, Violation> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            convert(row).ok_or(Violation::BadWidth {
                name,
                index,
                width: row.len(),
                expected: width,
            })
        })
        .collect()
}
