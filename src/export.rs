use std::{fs, path::Path};

use anyhow::Result;
use log::info;

use crate::{charts::ChartSeriesBundle, metrics::PerformanceMetrics};

pub const TIMESERIES_FILE: &str = "timeseries.csv";
pub const METRICS_FILE: &str = "metrics.csv";

/// Writes the time-indexed series of `bundle` and the run's metrics as CSV files in `dir`
pub fn write_bundle_csv(
    dir: &Path,
    bundle: &ChartSeriesBundle,
    metrics: &PerformanceMetrics,
) -> Result<()> {
    fs::create_dir_all(dir)?;

    let groups: Vec<_> = bundle
        .groups()
        .into_iter()
        .filter(|g| g.kind.is_timeseries())
        .collect();

    let mut header = vec!["time".to_string()];
    for group in &groups {
        for series in &group.series {
            header.push(format!("{}_{}", group.kind, series.key));
        }
    }

    let path = dir.join(TIMESERIES_FILE);
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(&header)?;

    for (i, t) in bundle.position.x.iter().enumerate() {
        let mut record = vec![t.to_string()];
        for group in &groups {
            for series in &group.series {
                record.push(series.values[i].to_string());
            }
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;

    info!(
        "Wrote {} samples to '{}'",
        bundle.position.len(),
        path.display()
    );

    let path = dir.join(METRICS_FILE);
    let mut writer = csv::Writer::from_path(&path)?;
    writer.serialize(metrics)?;
    writer.flush()?;

    info!("Wrote metrics to '{}'", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{charts::bind, results::testing};

    #[test]
    fn test_write_bundle_csv() {
        let dir = std::env::temp_dir().join(format!("quadcopter-dash-csv-{}", std::process::id()));

        let result = testing::result(4);
        let bundle = bind(&result);
        let mut metrics = PerformanceMetrics::compute(&result).unwrap();
        metrics.settling_time_s = None;

        write_bundle_csv(&dir, &bundle, &metrics).unwrap();

        let mut reader = csv::Reader::from_path(dir.join(TIMESERIES_FILE)).unwrap();
        let header: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_string)
            .collect();
        assert_eq!(header.len(), 1 + 3 + 3 + 4 + 2);
        assert_eq!(header[0], "time");
        assert_eq!(header[1], "position_x");
        assert_eq!(header[4], "orientation_roll");
        assert_eq!(header[12], "error_orientation");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 4);
        for (row, t) in rows.iter().zip(result.time()) {
            assert_eq!(row[0].parse::<f64>().unwrap(), *t);
        }
        assert_eq!(
            rows[2][7].parse::<f64>().unwrap(),
            bundle.control.series("thrust").unwrap().values[2]
        );

        let metrics_csv = fs::read_to_string(dir.join(METRICS_FILE)).unwrap();
        let mut lines = metrics_csv.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("settling_time_s,max_position_error_m,"));
        // Orientation metrics are in degrees, like the orientation chart
        assert!(header.ends_with(",rmse_orientation_deg,max_orientation_error_deg"));
        // No settling time is an empty field
        assert!(lines.next().unwrap().starts_with(','));

        fs::remove_dir_all(&dir).unwrap();
    }
}
