pub mod binder;
pub mod registry;

pub use binder::{ChartGroup, ChartKind, ChartSeriesBundle, Series, bind};
pub use registry::ChartRegistry;
