use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter};

use crate::{
    channels,
    metrics::{orientation_error_norm_deg, position_error_norm},
    results::{CONTROL_DIM, STATE_DIM, SimulationResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, Serialize)]
#[strum(serialize_all = "lowercase")]
pub enum ChartKind {
    Position,
    Orientation,
    Control,
    Error,
    Trajectory,
}

impl ChartKind {
    pub fn entity_path(&self) -> &'static str {
        match self {
            ChartKind::Position => channels::charts::POSITION,
            ChartKind::Orientation => channels::charts::ORIENTATION,
            ChartKind::Control => channels::charts::CONTROL,
            ChartKind::Error => channels::charts::ERROR,
            ChartKind::Trajectory => channels::charts::TRAJECTORY,
        }
    }

    /// Whether the x axis is simulation time
    pub fn is_timeseries(&self) -> bool {
        !matches!(self, ChartKind::Trajectory)
    }
}

/// One line (or scatter) of a chart, y values index-aligned with the chart's x axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    /// Short identifier, used as entity path component and CSV column
    pub key: &'static str,
    pub label: &'static str,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartGroup {
    pub kind: ChartKind,
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub x: Vec<f64>,
    pub series: Vec<Series>,
}

impl ChartGroup {
    fn new(
        kind: ChartKind,
        title: &'static str,
        x_label: &'static str,
        y_label: &'static str,
        x: Vec<f64>,
        series: Vec<Series>,
    ) -> Self {
        Self {
            kind,
            title,
            x_label,
            y_label,
            x,
            series,
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn series(&self, key: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.key == key)
    }

    /// (x, y) pairs of one series
    pub fn points<'a>(&'a self, series: &'a Series) -> impl Iterator<Item = (f64, f64)> + 'a {
        self.x.iter().copied().zip(series.values.iter().copied())
    }
}

/// The five chart groups of one result. Always replaced as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeriesBundle {
    pub position: ChartGroup,
    pub orientation: ChartGroup,
    pub control: ChartGroup,
    pub error: ChartGroup,
    pub trajectory: ChartGroup,
}

impl ChartSeriesBundle {
    /// Charts with their metadata but no data, as shown before the first run
    pub fn empty() -> Self {
        build(
            Vec::new(),
            std::array::from_fn(|_| Vec::new()),
            std::array::from_fn(|_| Vec::new()),
            Vec::new(),
            Vec::new(),
        )
    }

    pub fn groups(&self) -> [&ChartGroup; 5] {
        [
            &self.position,
            &self.orientation,
            &self.control,
            &self.error,
            &self.trajectory,
        ]
    }

    pub fn get(&self, kind: ChartKind) -> &ChartGroup {
        match kind {
            ChartKind::Position => &self.position,
            ChartKind::Orientation => &self.orientation,
            ChartKind::Control => &self.control,
            ChartKind::Error => &self.error,
            ChartKind::Trajectory => &self.trajectory,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups().iter().all(|g| g.is_empty())
    }
}

/// Maps a validated result onto the five chart groups.
///
/// Every series value at index `i` depends only on sample `i`; there is no
/// resampling or smoothing.
pub fn bind(result: &SimulationResult) -> ChartSeriesBundle {
    let time = result.time().to_vec();

    // State channels, with euler angles already in degrees
    let mut state_cols: [Vec<f64>; STATE_DIM] =
        std::array::from_fn(|_| Vec::with_capacity(result.len()));
    for state in result.states() {
        let euler_deg = state.euler_deg();
        for (c, col) in state_cols.iter_mut().enumerate() {
            let v = match c {
                6..=8 => euler_deg[c - 6],
                _ => state.0[c],
            };
            col.push(v);
        }
    }

    let mut input_cols: [Vec<f64>; CONTROL_DIM] =
        std::array::from_fn(|_| Vec::with_capacity(result.len()));
    for input in result.inputs() {
        for (c, col) in input_cols.iter_mut().enumerate() {
            col.push(input.0[c]);
        }
    }

    build(
        time,
        state_cols,
        input_cols,
        position_error_norm(result),
        orientation_error_norm_deg(result),
    )
}

fn build(
    time: Vec<f64>,
    state_cols: [Vec<f64>; STATE_DIM],
    input_cols: [Vec<f64>; CONTROL_DIM],
    pos_err: Vec<f64>,
    ori_err_deg: Vec<f64>,
) -> ChartSeriesBundle {
    let [x, y, z, _, _, _, roll, pitch, yaw, _, _, _] = state_cols;
    let [thrust, tau_x, tau_y, tau_z] = input_cols;

    let series = |key, label, values| Series { key, label, values };

    ChartSeriesBundle {
        position: ChartGroup::new(
            ChartKind::Position,
            "Drone Position",
            "Time (s)",
            "Position (m)",
            time.clone(),
            vec![
                series("x", "X Position (m)", x.clone()),
                series("y", "Y Position (m)", y.clone()),
                series("z", "Z Position (m)", z),
            ],
        ),
        orientation: ChartGroup::new(
            ChartKind::Orientation,
            "Drone Orientation",
            "Time (s)",
            "Angle (deg)",
            time.clone(),
            vec![
                series("roll", "Roll φ (deg)", roll),
                series("pitch", "Pitch θ (deg)", pitch),
                series("yaw", "Yaw ψ (deg)", yaw),
            ],
        ),
        control: ChartGroup::new(
            ChartKind::Control,
            "Control Inputs",
            "Time (s)",
            "Control Input",
            time.clone(),
            vec![
                series("thrust", "Thrust (N)", thrust),
                series("tau_x", "τx (N·m)", tau_x),
                series("tau_y", "τy (N·m)", tau_y),
                series("tau_z", "τz (N·m)", tau_z),
            ],
        ),
        error: ChartGroup::new(
            ChartKind::Error,
            "Error Metrics",
            "Time (s)",
            "Error",
            time,
            vec![
                series("position", "Position Error (m)", pos_err),
                series("orientation", "Orientation Error (deg)", ori_err_deg),
            ],
        ),
        trajectory: ChartGroup::new(
            ChartKind::Trajectory,
            "Drone Trajectory (X-Y Projection)",
            "X Position (m)",
            "Y Position (m)",
            x,
            vec![series("xy", "Drone Trajectory", y)],
        ),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::results::testing;

    #[test]
    fn test_empty_bundle() {
        let bundle = ChartSeriesBundle::empty();

        assert!(bundle.is_empty());
        assert_eq!(bundle.position.series.len(), 3);
        assert_eq!(bundle.control.series.len(), 4);
        assert_eq!(bundle.trajectory.title, "Drone Trajectory (X-Y Projection)");
    }

    #[test]
    fn test_bind_shapes() {
        let result = testing::result(7);
        let bundle = bind(&result);

        for group in bundle.groups() {
            assert_eq!(group.len(), 7, "{}", group.kind);
            for s in &group.series {
                assert_eq!(s.values.len(), 7, "{}/{}", group.kind, s.key);
            }
        }

        for kind in ChartKind::iter() {
            assert_eq!(bundle.get(kind).kind, kind);
        }
    }

    #[test]
    fn test_bind_values() {
        let result = testing::result(5);
        let bundle = bind(&result);

        assert_eq!(bundle.position.x, result.time());
        assert_eq!(bundle.control.x, result.time());

        for (i, state) in result.states().iter().enumerate() {
            assert_eq!(bundle.position.series("x").unwrap().values[i], state.0[0]);
            assert_eq!(bundle.position.series("y").unwrap().values[i], state.0[1]);
            assert_eq!(bundle.position.series("z").unwrap().values[i], state.0[2]);

            for (k, key) in ["roll", "pitch", "yaw"].iter().enumerate() {
                let deg = bundle.orientation.series(key).unwrap().values[i];
                assert_relative_eq!(deg.to_radians(), state.0[6 + k], epsilon = 1e-12);
            }

            assert_eq!(bundle.trajectory.x[i], state.0[0]);
            assert_eq!(bundle.trajectory.series("xy").unwrap().values[i], state.0[1]);
        }

        for (i, input) in result.inputs().iter().enumerate() {
            for (c, key) in ["thrust", "tau_x", "tau_y", "tau_z"].iter().enumerate() {
                assert_eq!(bundle.control.series(key).unwrap().values[i], input.0[c]);
            }
        }

        assert_eq!(
            bundle.error.series("position").unwrap().values,
            position_error_norm(&result)
        );
        assert_eq!(
            bundle.error.series("orientation").unwrap().values,
            orientation_error_norm_deg(&result)
        );
    }

    #[test]
    fn test_trajectory_points() {
        let result = testing::result(3);
        let bundle = bind(&result);
        let traj = &bundle.trajectory;

        let points: Vec<(f64, f64)> = traj.points(&traj.series[0]).collect();
        let expected: Vec<(f64, f64)> = result
            .states()
            .iter()
            .map(|s| (s.0[0], s.0[1]))
            .collect();

        assert_eq!(points, expected);
        assert!(!ChartKind::Trajectory.is_timeseries());
    }
}
