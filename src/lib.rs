pub mod channels;
pub mod charts;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod matrix;
pub mod metrics;
pub mod parameters;
pub mod presets;
pub mod render;
pub mod results;
pub mod session;

pub use error::DashboardError;
