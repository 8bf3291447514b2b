//! HTTP client for the external optimization service.

use std::collections::BTreeMap;

use async_trait::async_trait;
use firewatch_fire_models::ZoneLabel;
use serde::Serialize;

use crate::{OptimizationOutcome, OptimizerError, ResourceOptimizer};

#[derive(Serialize)]
struct OptimizeBody<'a> {
    zones: &'a BTreeMap<ZoneLabel, f64>,
}

#[derive(Serialize)]
struct SaveZoneBody {
    zone: ZoneLabel,
    firebreak_area_m2: f64,
}

/// Reqwest-backed [`ResourceOptimizer`] for the real optimization
/// service. Requests are sent once; failures surface to the caller.
#[derive(Debug, Clone)]
pub struct HttpOptimizer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOptimizer {
    /// Creates a client against the given API base URL.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Creates a client from the `OPTIMIZER_API_BASE` environment
    /// variable, defaulting to a local service.
    #[must_use]
    pub fn from_env(client: reqwest::Client) -> Self {
        let base_url = std::env::var("OPTIMIZER_API_BASE")
            .unwrap_or_else(|_| "http://localhost:8001".to_string());
        Self::new(client, base_url)
    }

    async fn post<T: Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
        token: Option<&str>,
    ) -> Result<reqwest::Response, OptimizerError> {
        let url = format!("{}{path}", self.base_url);

        let mut builder = self.client.post(&url).json(body);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OptimizerError::RemoteFailure {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ResourceOptimizer for HttpOptimizer {
    async fn optimize(
        &self,
        zones: &BTreeMap<ZoneLabel, f64>,
        token: Option<&str>,
    ) -> Result<OptimizationOutcome, OptimizerError> {
        log::debug!("Requesting allocation plan for {} zone(s)", zones.len());

        let response = self
            .post("/math/optimize", &OptimizeBody { zones }, token)
            .await?;
        let outcome: OptimizationOutcome = response.json().await?;

        if outcome.status != "success" {
            return Err(OptimizerError::Rejected(outcome.status));
        }

        Ok(outcome)
    }

    async fn save_zone(
        &self,
        zone: ZoneLabel,
        firebreak_area_m2: f64,
        token: Option<&str>,
    ) -> Result<(), OptimizerError> {
        self.post(
            "/zone/zone/save",
            &SaveZoneBody {
                zone,
                firebreak_area_m2,
            },
            token,
        )
        .await?;

        Ok(())
    }

    async fn clear_zones(&self, token: Option<&str>) -> Result<(), OptimizerError> {
        self.post("/zone/zone/clear", &serde_json::json!({}), token)
            .await?;

        Ok(())
    }
}
