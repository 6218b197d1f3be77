use anyhow::Result;
use itertools::{Itertools, MinMaxResult};
use log::{error, info, warn};

use super::{Renderer, Status};
use crate::{charts::ChartSeriesBundle, matrix::PresentedMatrix, metrics::MetricsTable};

/// Headless renderer: writes a summary of everything it is shown to the log
#[derive(Debug, Default)]
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn update_series(&mut self, seq: u64, bundle: &ChartSeriesBundle) -> Result<()> {
        info!("Run {seq}: charts updated");

        for group in bundle.groups() {
            info!("  {} ({} samples)", group.title, group.len());

            for series in &group.series {
                match series.values.iter().copied().minmax_by(f64::total_cmp) {
                    MinMaxResult::NoElements => info!("    {:<24} -", series.label),
                    MinMaxResult::OneElement(v) => info!("    {:<24} {v:.4}", series.label),
                    MinMaxResult::MinMax(min, max) => {
                        info!("    {:<24} min {min:.4}, max {max:.4}", series.label)
                    }
                }
            }
        }

        Ok(())
    }

    fn show_metrics(&mut self, table: &MetricsTable) -> Result<()> {
        info!("Performance metrics:");
        for row in &table.rows {
            info!("  {:<24} {}", row.label, row.value);
        }

        Ok(())
    }

    fn show_matrix(&mut self, matrix: Option<&PresentedMatrix>) -> Result<()> {
        let Some(matrix) = matrix else {
            warn!("No gain matrix available");
            return Ok(());
        };

        info!("LQR gain matrix K:");
        info!(
            "      {}",
            matrix
                .col_labels
                .iter()
                .format_with(" ", |l, f| f(&format_args!("{l:>10}")))
        );
        for (label, row) in matrix.row_labels.iter().zip(&matrix.cells) {
            info!(
                "  {label:<3} {}",
                row.iter().format_with(" ", |c, f| f(&format_args!("{c:>10}")))
            );
        }

        Ok(())
    }

    fn show_status(&mut self, status: &Status) -> Result<()> {
        match status {
            Status::Failed(_) => error!("{status}"),
            _ => info!("{status}"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{charts::bind, matrix::present, metrics::PerformanceMetrics, results::testing};

    #[test]
    fn test_log_renderer_accepts_everything() {
        let result = testing::result(4);
        let mut renderer = LogRenderer;

        renderer.update_series(1, &bind(&result)).unwrap();
        renderer
            .update_series(0, &ChartSeriesBundle::empty())
            .unwrap();

        let metrics = PerformanceMetrics::compute(&result).unwrap();
        renderer
            .show_metrics(&MetricsTable::from_metrics(&metrics))
            .unwrap();

        renderer
            .show_matrix(Some(&present(result.gain()).unwrap()))
            .unwrap();
        renderer.show_matrix(None).unwrap();

        renderer.show_status(&Status::Failed("boom".into())).unwrap();
    }
}
