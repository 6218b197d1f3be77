use std::{fs, path::Path, str::FromStr};

use anyhow::Result;
use log::info;
use serde::Serialize;
use thiserror::Error;

use crate::{
    client::SimulationRequest,
    parameters::{self, ParameterMap},
    presets::{Preset, Weights},
};

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000/run_simulation";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Parameter error: {0}")]
    Parameter(#[from] parameters::Error),

    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
}

/// Quadcopter physical properties
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleParams {
    pub ixx_kgm2: f64,
    pub iyy_kgm2: f64,
    pub izz_kgm2: f64,
    pub mass_kg: f64,
    pub g_m_s2: f64,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            ixx_kgm2: 0.0221,
            iyy_kgm2: 0.0221,
            izz_kgm2: 0.0366,
            mass_kg: 1.0,
            g_m_s2: 9.81,
        }
    }
}

impl VehicleParams {
    pub fn from_params(params: &ParameterMap) -> Result<Self, ConfigError> {
        let d = Self::default();

        Ok(Self {
            ixx_kgm2: params.float_or("Ixx", d.ixx_kgm2)?,
            iyy_kgm2: params.float_or("Iyy", d.iyy_kgm2)?,
            izz_kgm2: params.float_or("Izz", d.izz_kgm2)?,
            mass_kg: params.float_or("mass", d.mass_kg)?,
            g_m_s2: params.float_or("g", d.g_m_s2)?,
        })
    }
}

/// Initial state in user-facing units: attitude in degrees, everything else SI
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InitialConditions {
    pub pos_m: [f64; 3],
    pub vel_b_m_s: [f64; 3],
    /// Roll, pitch, yaw
    pub attitude_deg: [f64; 3],
    pub angvel_b_rad_s: [f64; 3],
}

impl InitialConditions {
    pub fn from_params(params: &ParameterMap) -> Result<Self, ConfigError> {
        Ok(Self {
            pos_m: params.float_vec_or("pos_m", [0.0; 3])?,
            vel_b_m_s: params.float_vec_or("vel_b_m_s", [0.0; 3])?,
            attitude_deg: params.float_vec_or("attitude_deg", [0.0; 3])?,
            angvel_b_rad_s: params.float_vec_or("angvel_b_rad_s", [0.0; 3])?,
        })
    }

    /// State vector as the service expects it, with angles in radians
    pub fn to_state(&self) -> [f64; 12] {
        let mut state = [0.0; 12];

        state[0..3].copy_from_slice(&self.pos_m);
        state[3..6].copy_from_slice(&self.vel_b_m_s);
        for (dst, deg) in state[6..9].iter_mut().zip(self.attitude_deg) {
            *dst = deg.to_radians();
        }
        state[9..12].copy_from_slice(&self.angvel_b_rad_s);

        state
    }
}

/// Every input of a simulation request, resolved once with explicit defaults
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardConfig {
    pub service_url: String,
    pub vehicle: VehicleParams,
    pub simulation_time_s: f64,
    pub dt_s: f64,
    pub initial: InitialConditions,
    pub preset: String,
    pub weights: Weights,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            vehicle: VehicleParams::default(),
            simulation_time_s: 15.0,
            dt_s: 0.01,
            initial: InitialConditions::default(),
            preset: Preset::Default.to_string(),
            weights: Weights::default(),
        }
    }
}

impl DashboardConfig {
    /// Resolves the configuration from a parameter tree.
    ///
    /// Weights start from `preset` (or the `weights.preset` parameter) and are
    /// then overridden by any explicit `weights.Q_diag` / `weights.R_diag`.
    pub fn from_params(
        params: &ParameterMap,
        preset: Option<Preset>,
    ) -> Result<Self, ConfigError> {
        let d = Self::default();

        let vehicle = match params.get_map("vehicle") {
            Ok(map) => VehicleParams::from_params(map)?,
            Err(parameters::Error::NotFound { .. }) => d.vehicle,
            Err(e) => return Err(e.into()),
        };

        let initial = match params.get_map("initial") {
            Ok(map) => InitialConditions::from_params(map)?,
            Err(parameters::Error::NotFound { .. }) => d.initial,
            Err(e) => return Err(e.into()),
        };

        let preset = match preset {
            Some(preset) => preset,
            None => {
                let name = params.string_or("weights.preset", &d.preset)?;
                Preset::from_str(&name).map_err(|_| ConfigError::UnknownPreset(name))?
            }
        };
        let preset_weights = preset.weights();

        let weights = Weights {
            q_diag: params.float_vec_or("weights.Q_diag", preset_weights.q_diag)?,
            r_diag: params.float_vec_or("weights.R_diag", preset_weights.r_diag)?,
        };

        Ok(Self {
            service_url: params.string_or("service.url", &d.service_url)?,
            vehicle,
            simulation_time_s: params.float_or("sim.simulation_time", d.simulation_time_s)?,
            dt_s: params.float_or("sim.dt", d.dt_s)?,
            initial,
            preset: preset.to_string(),
            weights,
        })
    }

    pub fn from_file(path: &Path, preset: Option<Preset>) -> Result<Self> {
        info!("Reading parameters from '{}'", path.display());

        let params_toml = fs::read_to_string(path)?;
        let params = parameters::parse_string(&params_toml)?;

        Ok(Self::from_params(&params, preset)?)
    }

    pub fn to_request(&self) -> SimulationRequest {
        SimulationRequest {
            ixx: self.vehicle.ixx_kgm2,
            iyy: self.vehicle.iyy_kgm2,
            izz: self.vehicle.izz_kgm2,
            mass: self.vehicle.mass_kg,
            g: self.vehicle.g_m_s2,
            simulation_time: self.simulation_time_s,
            dt: self.dt_s,
            initial_state: self.initial.to_state(),
            q_diag: self.weights.q_diag,
            r_diag: self.weights.r_diag,
        }
    }
}
