//! Typed pass-throughs to the backend AI endpoints.
//!
//! Every analytical result in the product (forecast, risk score, scenario
//! simulation, summary, chat assistant) is computed server-side; this crate
//! only names the routes and decodes the opaque DTOs. It deliberately adds
//! nothing on top: no retries, no caching, no local post-processing.

use std::sync::Arc;

use api_client::{ApiClient, ApiError, Result};
use models::{
    AssistantRequest, AssistantResponse, ForecastResponse, RiskSummary, ScenarioRequest,
    ScenarioResponse, SummaryResponse,
};

/// Fallback shown on the dashboard when the summary endpoint fails.
pub const SUMMARY_UNAVAILABLE: &str = "No se pudo obtener el resumen financiero.";

#[derive(Clone)]
pub struct AiClient {
    api: Arc<ApiClient>,
}

impl AiClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Savings forecast with the generated explanation attached.
    pub fn forecast(&self) -> Result<ForecastResponse> {
        self.api.get_authorized("/ai/forecast")
    }

    /// One forecast per historical prefix, oldest first.
    pub fn forecast_history(&self) -> Result<Vec<ForecastResponse>> {
        self.api.get_authorized("/ai/forecast/history")
    }

    pub fn risk_summary(&self) -> Result<RiskSummary> {
        self.api.get_authorized("/ai/risk-summary")
    }

    /// Dashboard summary line. Degrades instead of failing: any error other
    /// than an invalid session becomes the product's fallback string, so the
    /// dashboard always has something to show. An expired session still
    /// propagates, that one has to log the user out.
    pub fn summary(&self) -> Result<SummaryResponse> {
        match self.api.get_authorized::<SummaryResponse>("/ai/summary") {
            Ok(res) => Ok(res),
            Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized),
            Err(e) => {
                tracing::warn!(error = %e, "summary request failed, degrading");
                Ok(SummaryResponse {
                    summary: Some(SUMMARY_UNAVAILABLE.to_string()),
                    source: Some("error".to_string()),
                })
            }
        }
    }

    pub fn scenario(&self, request: &ScenarioRequest) -> Result<ScenarioResponse> {
        self.api.post_authorized("/ai/scenario", request)
    }

    pub fn assistant(
        &self,
        message: &str,
        context: Option<serde_json::Value>,
    ) -> Result<AssistantResponse> {
        let request = AssistantRequest {
            message: message.to_string(),
            context,
        };
        self.api.post_authorized("/ai/assistant", &request)
    }
}
