mod dataset;
mod vectors;

#[cfg(test)]
pub(crate) use dataset::testing;
pub use dataset::{RawSimulationResult, SimulationResult, Violation};
pub use vectors::{
    CONTROL_DIM, ControlVector, ErrorVector, GainMatrix, STATE_DIM, StateVector,
};
