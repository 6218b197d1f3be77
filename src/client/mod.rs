pub mod client;
pub mod wire;

pub use client::{HttpTransport, SimulationClient, Transport, parse_response};
pub use wire::SimulationRequest;
