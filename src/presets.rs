use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::results::{CONTROL_DIM, STATE_DIM};

/// LQR weighting: diagonals of the state cost Q and the control cost R
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Weights {
    pub q_diag: [f64; STATE_DIM],
    pub r_diag: [f64; CONTROL_DIM],
}

impl Default for Weights {
    fn default() -> Self {
        Preset::Default.weights()
    }
}

/// Named weight sets offered by the dashboard
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Preset {
    #[default]
    Default,
    Aggressive,
    Smooth,
    /// Favors position tracking over attitude
    Position,
    /// Favors attitude tracking over position
    Orientation,
}

impl Preset {
    pub fn weights(&self) -> Weights {
        match self {
            Preset::Default => Weights {
                q_diag: [
                    10.0, 10.0, 10.0, 1.0, 1.0, 1.0, 10.0, 10.0, 10.0, 1.0, 1.0, 1.0,
                ],
                r_diag: [1.0; CONTROL_DIM],
            },
            Preset::Aggressive => Weights {
                q_diag: [
                    20.0, 20.0, 20.0, 2.0, 2.0, 2.0, 20.0, 20.0, 20.0, 2.0, 2.0, 2.0,
                ],
                r_diag: [0.5; CONTROL_DIM],
            },
            Preset::Smooth => Weights {
                q_diag: [5.0, 5.0, 5.0, 0.5, 0.5, 0.5, 5.0, 5.0, 5.0, 0.5, 0.5, 0.5],
                r_diag: [2.0; CONTROL_DIM],
            },
            Preset::Position => Weights {
                q_diag: [
                    20.0, 20.0, 20.0, 2.0, 2.0, 2.0, 5.0, 5.0, 5.0, 0.5, 0.5, 0.5,
                ],
                r_diag: [1.0; CONTROL_DIM],
            },
            Preset::Orientation => Weights {
                q_diag: [
                    5.0, 5.0, 5.0, 0.5, 0.5, 0.5, 20.0, 20.0, 20.0, 2.0, 2.0, 2.0,
                ],
                r_diag: [1.0; CONTROL_DIM],
            },
        }
    }
}
