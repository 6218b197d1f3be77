use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::DashboardError,
    results::{CONTROL_DIM, STATE_DIM},
};

/// Body of a `run_simulation` request. Angles in `initial_state` are in radians.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRequest {
    #[serde(rename = "Ixx")]
    pub ixx: f64,
    #[serde(rename = "Iyy")]
    pub iyy: f64,
    #[serde(rename = "Izz")]
    pub izz: f64,
    pub mass: f64,
    pub g: f64,
    pub simulation_time: f64,
    pub dt: f64,
    pub initial_state: [f64; STATE_DIM],
    #[serde(rename = "Q_diag")]
    pub q_diag: [f64; STATE_DIM],
    #[serde(rename = "R_diag")]
    pub r_diag: [f64; CONTROL_DIM],
}

impl SimulationRequest {
    /// Rejects requests carrying NaN or infinite values, which JSON cannot represent
    pub fn check_finite(&self) -> Result<(), DashboardError> {
        let scalars = [
            ("Ixx", self.ixx),
            ("Iyy", self.iyy),
            ("Izz", self.izz),
            ("mass", self.mass),
            ("g", self.g),
            ("simulation_time", self.simulation_time),
            ("dt", self.dt),
        ];

        if let Some((name, _)) = scalars.iter().find(|(_, v)| !v.is_finite()) {
            return Err(DashboardError::InvalidRequest {
                field: name.to_string(),
            });
        }

        let arrays: [(&str, &[f64]); 3] = [
            ("initial_state", &self.initial_state),
            ("Q_diag", &self.q_diag),
            ("R_diag", &self.r_diag),
        ];

        for (name, values) in arrays {
            if let Some(i) = values.iter().position(|v| !v.is_finite()) {
                return Err(DashboardError::InvalidRequest {
                    field: format!("{name}[{i}]"),
                });
            }
        }

        Ok(())
    }
}

/// Outer object of every service response, successful or not
#[derive(Debug, Deserialize)]
pub(crate) struct ResponseEnvelope {
    pub success: bool,

    /// Kept untyped until `success` is known, so a failed response never
    /// has its payload validated
    #[serde(default)]
    pub result: Option<serde_json::Value>,

    #[serde(default)]
    pub error: Option<String>,
}

/// Bare tokens the service writes for non-finite numbers, which are not JSON
const NON_FINITE_TOKENS: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Parses a response body as JSON.
///
/// A body that only fails because of bare `NaN` / `Infinity` tokens is parsed
/// again with those tokens quoted, so the result validation can report which
/// sequence and row they are in.
pub(crate) fn parse_body(body: &str) -> serde_json::Result<Value> {
    match serde_json::from_str(body) {
        Err(err) if err.is_syntax() && at_non_finite_token(body, &err) => {
            serde_json::from_str(&quote_non_finite(body))
        }
        parsed => parsed,
    }
}

fn at_non_finite_token(body: &str, err: &serde_json::Error) -> bool {
    let line_start: usize = body
        .split_inclusive('\n')
        .take(err.line().saturating_sub(1))
        .map(str::len)
        .sum();
    let offset = line_start + err.column().saturating_sub(1);

    // The error points either at the token or at the byte after its first one
    [offset.saturating_sub(1), offset].into_iter().any(|i| {
        body.get(i..)
            .is_some_and(|rest| NON_FINITE_TOKENS.iter().any(|t| rest.starts_with(t)))
    })
}

fn quote_non_finite(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices();
    let mut in_string = false;

    while let Some((i, c)) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => out.extend(chars.next().map(|(_, escaped)| escaped)),
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match NON_FINITE_TOKENS.iter().find(|t| body[i..].starts_with(*t)) {
            Some(token) => {
                out.push('"');
                out.push_str(token);
                out.push('"');
                chars.by_ref().take(token.len() - 1).for_each(drop);
            }
            None => {
                in_string = c == '"';
                out.push(c);
            }
        }
    }

    out
}

#[cfg(test)]
pub(crate) mod testing {
    use super::SimulationRequest;

    pub fn request() -> SimulationRequest {
        SimulationRequest {
            ixx: 0.0221,
            iyy: 0.0221,
            izz: 0.0366,
            mass: 1.0,
            g: 9.81,
            simulation_time: 15.0,
            dt: 0.01,
            initial_state: [0.0; 12],
            q_diag: [1.0; 12],
            r_diag: [1.0; 4],
        }
    }
}
