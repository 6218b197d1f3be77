use std::path::PathBuf;

use anyhow::Result;
use log::info;
use rerun::{RecordingStream, RecordingStreamBuilder};

use super::{Renderer, Status};
use crate::{
    channels,
    charts::{ChartGroup, ChartSeriesBundle},
    matrix::PresentedMatrix,
    metrics::MetricsTable,
};

const APP_ID: &str = "quadcopter-dash";
const TIMELINE: &str = "sim_time";

/// Where recordings are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RerunSink {
    /// Spawn a local viewer, or reuse the one already running
    Spawn,
    /// Stream to a viewer listening on the default gRPC address
    Connect,
    /// Write one `run-NNNN.rrd` file per run into this directory
    Save(PathBuf),
}

/// Shows the dashboard in the Rerun viewer.
///
/// Every run gets its own recording, so series of different runs are never
/// drawn on the same plot.
pub struct RerunRenderer {
    sink: RerunSink,
    rec: Option<RecordingStream>,
}

impl RerunRenderer {
    pub fn new(sink: RerunSink) -> Self {
        Self { sink, rec: None }
    }

    fn open(&self, seq: u64) -> Result<RecordingStream> {
        let builder = RecordingStreamBuilder::new(APP_ID).recording_id(format!("run-{seq}"));

        let rec = match &self.sink {
            RerunSink::Spawn => builder.spawn()?,
            RerunSink::Connect => builder.connect_grpc()?,
            RerunSink::Save(dir) => {
                let path = dir.join(format!("run-{seq:04}.rrd"));
                info!("Saving recording to '{}'", path.display());
                builder.save(path)?
            }
        };

        Ok(rec)
    }

    /// Recording of the run currently displayed, opening a placeholder one before the first run
    fn rec(&mut self) -> Result<&RecordingStream> {
        let rec = match self.rec.take() {
            Some(rec) => rec,
            None => self.open(0)?,
        };

        Ok(self.rec.insert(rec))
    }

    fn log_timeseries(rec: &RecordingStream, group: &ChartGroup) -> Result<()> {
        let path = group.kind.entity_path();

        for (i, t) in group.x.iter().enumerate() {
            rec.set_duration_secs(TIMELINE, *t);

            for series in &group.series {
                rec.log(
                    format!("{path}/{}", series.key),
                    &rerun::Scalar::new(series.values[i]),
                )?;
            }
        }

        Ok(())
    }

    fn log_trajectory(rec: &RecordingStream, group: &ChartGroup) -> Result<()> {
        let path = group.kind.entity_path();

        for series in &group.series {
            let points: Vec<[f32; 2]> = group
                .points(series)
                .map(|(x, y)| [x as f32, y as f32])
                .collect();

            rec.log_static(
                format!("{path}/{}", series.key),
                &rerun::Points2D::new(points)
                    .with_radii([rerun::Radius::new_ui_points(2.0)])
                    .with_colors([rerun::Color::from_rgb(75, 192, 192)]),
            )?;
        }

        Ok(())
    }

    fn log_legend(rec: &RecordingStream, group: &ChartGroup) -> Result<()> {
        let mut md = format!(
            "## {}\n\nx: {}, y: {}\n\n",
            group.title, group.x_label, group.y_label
        );
        for series in &group.series {
            md.push_str(&format!("- `{}`: {}\n", series.key, series.label));
        }

        rec.log_static(
            format!("{}/legend", group.kind.entity_path()),
            &rerun::TextDocument::from_markdown(md),
        )?;

        Ok(())
    }
}

impl Renderer for RerunRenderer {
    fn update_series(&mut self, seq: u64, bundle: &ChartSeriesBundle) -> Result<()> {
        // Dropping the previous stream flushes it
        let rec = self.open(seq)?;

        for group in bundle.groups() {
            Self::log_legend(&rec, group)?;

            if group.kind.is_timeseries() {
                Self::log_timeseries(&rec, group)?;
            } else {
                Self::log_trajectory(&rec, group)?;
            }
        }

        self.rec = Some(rec);

        Ok(())
    }

    fn show_metrics(&mut self, table: &MetricsTable) -> Result<()> {
        self.rec()?.log_static(
            channels::panels::METRICS,
            &rerun::TextDocument::from_markdown(table.to_string()),
        )?;

        Ok(())
    }

    fn show_matrix(&mut self, matrix: Option<&PresentedMatrix>) -> Result<()> {
        let md = match matrix {
            Some(matrix) => format!("## LQR Gain Matrix (K)\n\n{matrix}"),
            None => "No gain matrix available".to_string(),
        };

        self.rec()?.log_static(
            channels::panels::GAIN_MATRIX,
            &rerun::TextDocument::from_markdown(md),
        )?;

        Ok(())
    }

    fn show_status(&mut self, status: &Status) -> Result<()> {
        let level = match status {
            Status::Failed(_) => rerun::TextLogLevel::ERROR,
            _ => rerun::TextLogLevel::INFO,
        };

        self.rec()?.log_static(
            channels::panels::STATUS,
            &rerun::TextLog::new(status.to_string()).with_level(level),
        )?;

        Ok(())
    }
}
