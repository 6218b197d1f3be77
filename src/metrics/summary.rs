use std::fmt::Display;

use itertools::{Itertools, izip};
use serde::Serialize;

use super::engine::{max, orientation_error_norm_deg, position_error_norm, rmse, settling_time};
use crate::{error::DashboardError, results::SimulationResult};

/// Summary figures shown in the dashboard's metrics table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub settling_time_s: Option<f64>,
    pub max_position_error_m: f64,
    pub rmse_position_m: f64,
    /// Integral of the absolute position error over the run
    pub iae_position_m_s: f64,
    pub max_control_effort: f64,
    pub control_energy: f64,
    pub rmse_orientation_deg: f64,
    pub max_orientation_error_deg: f64,
}

impl PerformanceMetrics {
    pub fn compute(result: &SimulationResult) -> Result<Self, DashboardError> {
        let time = result.time();
        let pos_err = position_error_norm(result);
        let ori_err = orientation_error_norm_deg(result);

        let effort: Vec<f64> = result.inputs().iter().map(|u| u.0.norm()).collect();
        let power: Vec<f64> = result.inputs().iter().map(|u| u.0.norm_squared()).collect();

        Ok(Self {
            settling_time_s: settling_time(&pos_err, time),
            max_position_error_m: max(&pos_err)?,
            rmse_position_m: rmse(&pos_err)?,
            iae_position_m_s: trapz(&pos_err, time),
            max_control_effort: max(&effort)?,
            control_energy: trapz(&power, time),
            rmse_orientation_deg: rmse(&ori_err)?,
            max_orientation_error_deg: max(&ori_err)?,
        })
    }
}

/// Trapezoidal integral of `y` over `x`
fn trapz(y: &[f64], x: &[f64]) -> f64 {
    izip!(x.iter().tuple_windows(), y.iter().tuple_windows())
        .map(|((x0, x1), (y0, y1))| (x1 - x0) * (y0 + y1) / 2.0)
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRow {
    pub label: String,
    pub value: String,
}

/// Label/value rows, already formatted for display
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MetricsTable {
    pub rows: Vec<MetricRow>,
}

impl MetricsTable {
    pub fn from_metrics(metrics: &PerformanceMetrics) -> Self {
        let settling = match metrics.settling_time_s {
            Some(t) => format!("{t:.2} s"),
            None => "N/A".to_string(),
        };

        let rows = [
            ("Settling Time", settling),
            (
                "Max Position Error",
                format!("{:.4} m", metrics.max_position_error_m),
            ),
            ("RMSE Position", format!("{:.4} m", metrics.rmse_position_m)),
            ("IAE Position", format!("{:.4} m·s", metrics.iae_position_m_s)),
            (
                "Max Control Effort",
                format!("{:.4}", metrics.max_control_effort),
            ),
            ("Control Energy", format!("{:.4}", metrics.control_energy)),
            (
                "RMSE Orientation",
                format!("{:.4} deg", metrics.rmse_orientation_deg),
            ),
            (
                "Max Orientation Error",
                format!("{:.4} deg", metrics.max_orientation_error_deg),
            ),
        ];

        Self {
            rows: rows
                .into_iter()
                .map(|(label, value)| MetricRow {
                    label: label.to_string(),
                    value,
                })
                .collect(),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
    }
}

impl Display for MetricsTable {
    /// Markdown table
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "| Metric | Value |")?;
        writeln!(f, "|---|---|")?;
        for row in &self.rows {
            writeln!(f, "| {} | {} |", row.label, row.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::results::testing;

    #[test]
    fn test_trapz() {
        assert_eq!(trapz(&[], &[]), 0.0);
        assert_eq!(trapz(&[5.0], &[1.0]), 0.0);
        assert_relative_eq!(trapz(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0]), 2.0);
        assert_relative_eq!(trapz(&[1.0, 1.0], &[0.0, 0.5]), 0.5);
    }

    #[test]
    fn test_compute() {
        // position error norm is 3k with k = 10..1, sampled every 0.1 s
        let result = testing::result(10);
        let metrics = PerformanceMetrics::compute(&result).unwrap();

        assert_relative_eq!(metrics.max_position_error_m, 30.0);
        // 0.02 * 30 = 0.6, never reached since the smallest error is 3
        assert_eq!(metrics.settling_time_s, None);

        let expected_rmse = ((1..=10).map(|k| (3 * k * 3 * k) as f64).sum::<f64>() / 10.0).sqrt();
        assert_relative_eq!(metrics.rmse_position_m, expected_rmse, epsilon = 1e-12);

        // Linear ramp from 30 to 3 over 0.9 s
        assert_relative_eq!(metrics.iae_position_m_s, 0.9 * 33.0 / 2.0, epsilon = 1e-9);

        assert_relative_eq!(
            metrics.max_orientation_error_deg,
            1.0f64.to_degrees(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_table() {
        let metrics = PerformanceMetrics {
            settling_time_s: Some(2.5),
            max_position_error_m: 1.0,
            rmse_position_m: 0.123456,
            iae_position_m_s: 0.0,
            max_control_effort: 10.0,
            control_energy: 100.0,
            rmse_orientation_deg: 0.5,
            max_orientation_error_deg: 2.0,
        };

        let table = MetricsTable::from_metrics(&metrics);
        assert_eq!(table.rows.len(), 8);
        assert_eq!(table.get("Settling Time"), Some("2.50 s"));
        assert_eq!(table.get("Max Position Error"), Some("1.0000 m"));
        assert_eq!(table.get("RMSE Position"), Some("0.1235 m"));

        let unsettled = MetricsTable::from_metrics(&PerformanceMetrics {
            settling_time_s: None,
            ..metrics
        });
        assert_eq!(unsettled.get("Settling Time"), Some("N/A"));

        let md = table.to_string();
        assert!(md.starts_with("| Metric | Value |\n|---|---|\n"));
        assert!(md.contains("| RMSE Position | 0.1235 m |"));
    }
}
