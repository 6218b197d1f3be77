use nalgebra::{SMatrix, SVector, Vector3};

pub const STATE_DIM: usize = 12;
pub const CONTROL_DIM: usize = 4;

/// Quadcopter state: position (x, y, z), body velocity (u, v, w),
/// euler angles (phi, theta, psi) in radians, body rates (p, q, r).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StateVector(pub SVector<f64, STATE_DIM>);

impl StateVector {
    pub fn from_slice(row: &[f64]) -> Option<Self> {
        (row.len() == STATE_DIM).then(|| Self(SVector::from_column_slice(row)))
    }

    pub fn pos_m(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(0).clone_owned()
    }

    pub fn vel_b_m_s(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(3).clone_owned()
    }

    pub fn euler_rad(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(6).clone_owned()
    }

    pub fn angvel_b_rad_s(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(9).clone_owned()
    }

    pub fn euler_deg(&self) -> Vector3<f64> {
        self.euler_rad().map(f64::to_degrees)
    }
}

/// Tracking error, same layout as [`StateVector`]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ErrorVector(pub SVector<f64, STATE_DIM>);

impl ErrorVector {
    pub fn from_slice(row: &[f64]) -> Option<Self> {
        (row.len() == STATE_DIM).then(|| Self(SVector::from_column_slice(row)))
    }

    pub fn pos_m(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(0).clone_owned()
    }

    pub fn euler_rad(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(6).clone_owned()
    }
}

/// Thrust followed by the three body torques
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ControlVector(pub SVector<f64, CONTROL_DIM>);

impl ControlVector {
    pub fn from_slice(row: &[f64]) -> Option<Self> {
        (row.len() == CONTROL_DIM).then(|| Self(SVector::from_column_slice(row)))
    }

    pub fn thrust_n(&self) -> f64 {
        self.0[0]
    }

    pub fn torque_b_nm(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(1).clone_owned()
    }
}

/// Controller gain, rows are control channels and columns state channels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainMatrix(pub SMatrix<f64, CONTROL_DIM, STATE_DIM>);

impl GainMatrix {
    /// Builds the matrix from row-major rows. Returns `None` unless the rows form exactly a 4x12 grid.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        if rows.len() != CONTROL_DIM || rows.iter().any(|r| r.len() != STATE_DIM) {
            return None;
        }

        Some(Self(SMatrix::from_fn(|r, c| rows[r][c])))
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[(row, col)]
    }
}
