pub mod logger;
pub mod rerun;

use std::fmt::Display;

use anyhow::Result;

use crate::{charts::ChartSeriesBundle, matrix::PresentedMatrix, metrics::MetricsTable};

pub use self::logger::LogRenderer;
pub use self::rerun::{RerunRenderer, RerunSink};

/// User-visible state of the most recent request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Running,
    Completed,
    Failed(String),
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Running => write!(f, "Running simulation..."),
            Status::Completed => write!(f, "Simulation completed successfully"),
            Status::Failed(msg) => write!(f, "Error: {msg}"),
        }
    }
}

/// Presentation surface of the dashboard. The core only talks to this trait.
pub trait Renderer: Send {
    /// Replaces every chart with the series of run `seq`
    fn update_series(&mut self, seq: u64, bundle: &ChartSeriesBundle) -> Result<()>;

    fn show_metrics(&mut self, table: &MetricsTable) -> Result<()>;

    /// `None` means the current run has no gain matrix to show
    fn show_matrix(&mut self, matrix: Option<&PresentedMatrix>) -> Result<()>;

    fn show_status(&mut self, status: &Status) -> Result<()>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn update_series(&mut self, seq: u64, bundle: &ChartSeriesBundle) -> Result<()> {
        (**self).update_series(seq, bundle)
    }

    fn show_metrics(&mut self, table: &MetricsTable) -> Result<()> {
        (**self).show_metrics(table)
    }

    fn show_matrix(&mut self, matrix: Option<&PresentedMatrix>) -> Result<()> {
        (**self).show_matrix(matrix)
    }

    fn show_status(&mut self, status: &Status) -> Result<()> {
        (**self).show_status(status)
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_status_messages() {
        assert_eq!(Status::Running.to_string(), "Running simulation...");
        assert_eq!(
            Status::Completed.to_string(),
            "Simulation completed successfully"
        );
        assert_eq!(
            Status::Failed("connection refused".to_string()).to_string(),
            "Error: connection refused"
        );
    }
}
