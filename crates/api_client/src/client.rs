use std::sync::RwLock;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use reqwest::blocking::Response;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use models::{
    FinancialRecord, FinancialRecordOut, HistoryRequest, LoginRequest, Profile, RegisterRequest,
    Settings, TokenResponse,
};

use crate::error::{ApiError, Result};

/// Configuration for talking to the finscope backend.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout_secs: Option<u64>,
}

impl ApiClientConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            timeout_secs: settings.timeout_secs,
        }
    }
}

/// Blocking HTTP client for the backend REST API.
///
/// The token slot is behind a lock so the UI can share one client across its
/// worker threads; requests read the slot at send time, mirroring how the
/// browser build re-read local storage on every request.
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(config: ApiClientConfig) -> anyhow::Result<Self> {
        // Parse up front so a bad base URL fails at startup, not mid-session.
        let parsed = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid base URL: {}", config.base_url))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => anyhow::bail!("Unsupported scheme '{other}' for backend URL"),
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::blocking::Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn set_token(&self, token: String) {
        *self.token.write().unwrap() = Some(token);
    }

    pub fn clear_token(&self) {
        *self.token.write().unwrap() = None;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current token, but only if it still passes the client-side expiry
    /// check. Anything else is already an invalid session.
    fn bearer(&self) -> Result<String> {
        let guard = self.token.read().unwrap();
        match guard.as_deref() {
            Some(token) if auth::token_is_valid(token, Utc::now()) => Ok(token.to_string()),
            Some(_) => {
                tracing::warn!("stored token is expired or malformed");
                Err(ApiError::Unauthorized)
            }
            None => Err(ApiError::Unauthorized),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // Auth endpoints

    pub fn login(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        tracing::debug!("POST /auth/login");
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&request)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        read_json(response)
    }

    pub fn register(&self, request: &RegisterRequest) -> Result<()> {
        tracing::debug!("POST /auth/register");
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(request)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        read_status(response)
    }

    pub fn profile(&self) -> Result<Profile> {
        self.get_authorized("/profile")
    }

    // Financial data endpoints

    pub fn financial_history(&self, request: &HistoryRequest) -> Result<Vec<FinancialRecordOut>> {
        self.post_authorized("/financial/history", request)
    }

    pub fn upload_record(&self, record: &FinancialRecord) -> Result<()> {
        let bearer = self.bearer()?;
        tracing::debug!("POST /financial/upload");
        let response = self
            .http
            .post(self.url("/financial/upload"))
            .bearer_auth(bearer)
            .json(record)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        read_status(response)
    }

    pub fn delete_record(&self, id: &str) -> Result<()> {
        let bearer = self.bearer()?;
        tracing::debug!(id, "DELETE /financial/delete");
        let response = self
            .http
            .delete(self.url(&format!("/financial/delete/{id}")))
            .bearer_auth(bearer)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        read_status(response)
    }

    // Generic authorized calls, shared with the AI wrappers.

    pub fn get_authorized<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let bearer = self.bearer()?;
        tracing::debug!(path, "GET");
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(bearer)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        read_json(response)
    }

    pub fn post_authorized<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let bearer = self.bearer()?;
        tracing::debug!(path, "POST");
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(bearer)
            .json(body)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        read_json(response)
    }
}

/// Checks the status and decodes the body.
fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response)?;
    response.json().map_err(|e| ApiError::Parse(e.to_string()))
}

/// Checks the status and drops the body.
fn read_status(response: Response) -> Result<()> {
    check_status(response).map(|_| ())
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        tracing::warn!("backend answered 401, invalidating session");
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        let detail = extract_detail(response);
        tracing::warn!(code = status.as_u16(), %detail, "request failed");
        return Err(ApiError::Status {
            code: status.as_u16(),
            detail,
        });
    }
    Ok(response)
}

/// Best-effort extraction of FastAPI-style `{"detail": ...}` error bodies.
fn extract_detail(response: Response) -> String {
    let fallback = || "sin detalle".to_string();
    let body: serde_json::Value = match response.json() {
        Ok(v) => v,
        Err(_) => return fallback(),
    };
    match body.get("detail") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(ApiClientConfig {
            base_url: "http://localhost:8000/".to_string(),
            timeout_secs: None,
        })
        .unwrap()
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        assert!(ApiClient::new(ApiClientConfig {
            base_url: "not a url".to_string(),
            timeout_secs: None,
        })
        .is_err());

        assert!(ApiClient::new(ApiClientConfig {
            base_url: "ftp://localhost".to_string(),
            timeout_secs: None,
        })
        .is_err());
    }

    #[test]
    fn test_url_building_strips_trailing_slash() {
        let client = client();
        assert_eq!(client.url("/profile"), "http://localhost:8000/profile");
        assert_eq!(
            client.url("/financial/delete/abc123"),
            "http://localhost:8000/financial/delete/abc123"
        );
    }

    #[test]
    fn test_missing_token_is_unauthorized_before_sending() {
        let client = client();
        let err = client.bearer().unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_expired_token_is_unauthorized_before_sending() {
        use base64::Engine;
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let payload = engine.encode(br#"{"exp": 1000000000}"#);
        let token = format!("h.{payload}.s");

        let client = client();
        client.set_token(token);
        assert!(client.bearer().unwrap_err().is_unauthorized());
    }

    #[test]
    fn test_valid_token_passes_the_local_check() {
        use base64::Engine;
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        // exp far in the future
        let payload = engine.encode(br#"{"exp": 4000000000}"#);
        let token = format!("h.{payload}.s");

        let client = client();
        client.set_token(token.clone());
        assert_eq!(client.bearer().unwrap(), token);

        client.clear_token();
        assert!(client.bearer().is_err());
    }
}
