use std::{fmt::Debug, io::Read};

use log::{debug, info, warn};

use super::wire::{ResponseEnvelope, SimulationRequest, parse_body};
use crate::{
    error::{BoxedError, DashboardError},
    results::{RawSimulationResult, SimulationResult, Violation},
};

/// Moves a JSON request body to the simulation service and returns the raw response body.
///
/// An HTTP error status is not a transport failure as long as the service
/// answered with a body: the service reports its own failures that way.
pub trait Transport: Send + Sync + Debug {
    fn post_json(&self, body: &str) -> Result<String, BoxedError>;
}

#[derive(Debug)]
pub struct HttpTransport {
    agent: ureq::Agent,
    url: String,
}

impl HttpTransport {
    pub fn new(url: &str) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            url: url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, body: &str) -> Result<String, BoxedError> {
        let response = match self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .send_string(body)
        {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                debug!("Simulation service answered with status {code}");
                response
            }
            Err(err) => return Err(err.into()),
        };

        // Result payloads of long runs exceed the size cap of `into_string`
        let mut body = String::new();
        response.into_reader().read_to_string(&mut body)?;

        Ok(body)
    }
}

#[derive(Debug)]
pub struct SimulationClient {
    transport: Box<dyn Transport>,
}

impl SimulationClient {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    pub fn http(url: &str) -> Self {
        Self::new(HttpTransport::new(url))
    }

    /// Runs one simulation and returns its validated result. Never retries.
    pub fn submit(&self, request: &SimulationRequest) -> Result<SimulationResult, DashboardError> {
        request.check_finite()?;

        let body = serde_json::to_string(request)
            .map_err(|e| DashboardError::TransportFailure(Box::new(e)))?;

        info!(
            "Requesting simulation: {} s at dt = {} s",
            request.simulation_time, request.dt
        );

        let response = self
            .transport
            .post_json(&body)
            .map_err(DashboardError::TransportFailure)?;

        let result = parse_response(&response);
        match &result {
            Ok(r) => info!("Received simulation result with {} samples", r.len()),
            Err(e) => warn!("Simulation request failed: {e}"),
        }

        result
    }
}

/// Decodes a service response body into a validated result
pub fn parse_response(body: &str) -> Result<SimulationResult, DashboardError> {
    let value = parse_body(body).map_err(|e| DashboardError::TransportFailure(Box::new(e)))?;

    let envelope: ResponseEnvelope = serde_json::from_value(value)
        .map_err(|e| Violation::Malformed(e.to_string()))?;

    if !envelope.success {
        return Err(DashboardError::ServiceFailure(
            envelope.error.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }

    let payload = envelope.result.ok_or(Violation::MissingResult)?;
    let raw: RawSimulationResult =
        serde_json::from_value(payload).map_err(|e| Violation::Malformed(e.to_string()))?;

    Ok(SimulationResult::try_from(raw)?)
}
