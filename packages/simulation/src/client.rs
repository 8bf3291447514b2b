//! HTTP client for the external simulation service.

use async_trait::async_trait;

use crate::{FireSimulator, SimulationError, SimulationRequest, SimulationResponse, validate};

/// Reqwest-backed [`FireSimulator`] for the real simulation service.
///
/// Requests are validated locally first and sent once; a failure is
/// surfaced to the caller rather than retried.
#[derive(Debug, Clone)]
pub struct HttpSimulator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSimulator {
    /// Creates a client against the given API base URL.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Creates a client from the `SIMULATOR_API_BASE` environment
    /// variable, defaulting to a local service.
    #[must_use]
    pub fn from_env(client: reqwest::Client) -> Self {
        let base_url = std::env::var("SIMULATOR_API_BASE")
            .unwrap_or_else(|_| "http://localhost:8001".to_string());
        Self::new(client, base_url)
    }
}

#[async_trait]
impl FireSimulator for HttpSimulator {
    async fn simulate(
        &self,
        request: &SimulationRequest,
        token: Option<&str>,
    ) -> Result<SimulationResponse, SimulationError> {
        validate(request)?;

        let url = format!("{}/fire/fire/simulate", self.base_url);
        log::debug!(
            "Running simulation at ({}, {}) on {}x{} grid",
            request.lat,
            request.lon,
            request.grid_x,
            request.grid_y
        );

        let mut builder = self.client.post(&url).json(request);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SimulationError::RemoteFailure {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
