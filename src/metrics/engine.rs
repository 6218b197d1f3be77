use crate::{error::DashboardError, results::SimulationResult};

/// Band, relative to the peak position error, inside which the vehicle counts as settled
pub const SETTLING_BAND: f64 = 0.02;

/// Euclidean norm of the (x, y, z) error for every sample
pub fn position_error_norm(result: &SimulationResult) -> Vec<f64> {
    result.error().iter().map(|e| e.pos_m().norm()).collect()
}

/// Euclidean norm of the (phi, theta, psi) error for every sample, in degrees
pub fn orientation_error_norm_deg(result: &SimulationResult) -> Vec<f64> {
    result
        .error()
        .iter()
        .map(|e| e.euler_rad().norm().to_degrees())
        .collect()
}

/// First time at which the position error falls within [`SETTLING_BAND`] of its peak.
///
/// The threshold is taken relative to the maximum error over the whole run, not
/// to the final value. Returns `None` if the error never enters the band, or if
/// there are no samples.
pub fn settling_time(position_error_norm: &[f64], time: &[f64]) -> Option<f64> {
    let max_err = position_error_norm.iter().copied().reduce(f64::max)?;
    let threshold = SETTLING_BAND * max_err;

    position_error_norm
        .iter()
        .zip(time)
        .find(|&(&err, _)| err <= threshold)
        .map(|(_, &t)| t)
}

pub fn rmse(series: &[f64]) -> Result<f64, DashboardError> {
    if series.is_empty() {
        return Err(DashboardError::DivisionUndefined);
    }

    let sum_sq: f64 = series.iter().map(|v| v * v).sum();

    Ok((sum_sq / series.len() as f64).sqrt())
}

pub fn max(series: &[f64]) -> Result<f64, DashboardError> {
    series
        .iter()
        .copied()
        .reduce(f64::max)
        .ok_or(DashboardError::DivisionUndefined)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::results::testing;

    #[test]
    fn test_position_error_norm() {
        let result = testing::result(6);
        let norm = position_error_norm(&result);

        assert_eq!(norm.len(), result.len());
        for (e, n) in result.error().iter().zip(&norm) {
            let v = e.0;
            assert_relative_eq!(*n, (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt());
        }

        // error rows are (k, 2k, 2k, ...) with k counting down from 6
        assert_relative_eq!(norm[0], 18.0);
        assert_relative_eq!(norm[5], 3.0);
    }

    #[test]
    fn test_orientation_error_norm_deg() {
        let result = testing::result(4);
        let norm = orientation_error_norm_deg(&result);

        for (e, n) in result.error().iter().zip(&norm) {
            let v = e.0;
            let expected = (v[6] * v[6] + v[7] * v[7] + v[8] * v[8]).sqrt() * 180.0
                / std::f64::consts::PI;
            assert_relative_eq!(*n, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_settling_time() {
        assert_eq!(
            settling_time(&[10.0, 5.0, 0.1, 0.1], &[0.0, 1.0, 2.0, 3.0]),
            Some(2.0)
        );

        // Never enters the band
        assert_eq!(settling_time(&[10.0, 5.0, 1.0], &[0.0, 1.0, 2.0]), None);

        assert_eq!(settling_time(&[], &[]), None);

        // Zero error throughout settles immediately
        assert_eq!(settling_time(&[0.0, 0.0], &[0.5, 1.0]), Some(0.5));

        // The band edge is inclusive
        assert_eq!(
            settling_time(&[10.0, 0.2, 0.1], &[0.0, 1.0, 2.0]),
            Some(1.0)
        );
    }

    #[test]
    fn test_rmse() {
        assert_eq!(rmse(&[0.0, 0.0, 0.0]).unwrap(), 0.0);
        assert_relative_eq!(rmse(&[3.0, 4.0]).unwrap(), 3.5355339059327378);
        assert!(matches!(rmse(&[]), Err(DashboardError::DivisionUndefined)));
    }

    #[test]
    fn test_deterministic() {
        let result = testing::result(20);

        assert_eq!(position_error_norm(&result), position_error_norm(&result));
        assert_eq!(
            orientation_error_norm_deg(&result),
            orientation_error_norm_deg(&result)
        );
    }
}
