pub mod engine;
pub mod summary;

pub use engine::{orientation_error_norm_deg, position_error_norm, rmse, settling_time};
pub use summary::{MetricRow, MetricsTable, PerformanceMetrics};
