pub mod charts {
    pub const POSITION: &str = "/charts/position";
    pub const ORIENTATION: &str = "/charts/orientation";
    pub const CONTROL: &str = "/charts/control";
    pub const ERROR: &str = "/charts/error";
    pub const TRAJECTORY: &str = "/charts/trajectory";
}

pub mod panels {
    pub const STATUS: &str = "/panels/status";
    pub const METRICS: &str = "/panels/metrics";
    pub const GAIN_MATRIX: &str = "/panels/gain_matrix";
}
