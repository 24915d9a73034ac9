//! HTTP client for the provisioning API.
//!
//! One `reqwest::Client` per process, built once with the configured per-call
//! timeout so a hung upstream can never pin a user-facing request forever.
//! Response payloads the gateway actually inspects (login grant, user list,
//! availability, zones) are typed here so upstream schema drift fails loudly
//! in one place; the customer lookup stays a verbatim passthrough.
//!
//! No retries anywhere: the first failure surfaces to the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::GatewayConfig;

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Upstream answered with a non-2xx status. `body` is kept verbatim so
    /// passthrough routes can relay it unchanged.
    #[error("upstream returned {status}")]
    Rejected {
        status: u16,
        message: Option<String>,
        body: Value,
    },
    #[error("upstream request failed: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("malformed upstream response: {0}")]
    Malformed(#[source] reqwest::Error),
}

// ─── Typed payloads ───────────────────────────────────────────────────────────

/// POST /auth/login response. Upstream returns more fields; only the bearer
/// token matters here.
#[derive(Debug, Deserialize)]
pub struct LoginGrant {
    pub token: String,
}

/// One entry of GET /users. Fields are individually optional: a record with
/// no uuid exists in the wild and must not break the whole login.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserRecord {
    pub email: String,
    pub uuid: Option<String>,
    pub customer_uuid: Option<String>,
}

/// One row of GET /locations/{pop}/port-availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortAvailability {
    pub zone: String,
    pub speed: String,
    pub media: String,
    pub count: u32,
    pub partial: bool,
    pub enni: bool,
}

impl Default for PortAvailability {
    fn default() -> Self {
        Self {
            zone: String::new(),
            speed: String::new(),
            media: String::new(),
            count: 0,
            partial: false,
            enni: false,
        }
    }
}

// ─── Client ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
        })
    }

    /// Exchange credentials for a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, UpstreamError> {
        let resp = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&serde_json::json!({ "login": email, "password": password }))
            .send()
            .await
            .map_err(UpstreamError::Unreachable)?;
        let resp = reject_non_success(resp).await?;
        resp.json().await.map_err(UpstreamError::Malformed)
    }

    /// List the users visible to a freshly issued bearer token. Used to
    /// resolve the stable user identifier after login; upstream has no
    /// "get current user" endpoint.
    pub async fn list_users(&self, token: &str) -> Result<Vec<UserRecord>, UpstreamError> {
        let resp = self
            .http
            .get(format!("{}/users", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(UpstreamError::Unreachable)?;
        let resp = reject_non_success(resp).await?;
        resp.json().await.map_err(UpstreamError::Malformed)
    }

    /// Verbatim customer lookup with the session's stored token.
    pub async fn customer(&self, token: &str, customer_uuid: &str) -> Result<Value, UpstreamError> {
        let resp = self
            .http
            .get(format!("{}/customers/{customer_uuid}", self.base_url))
            .header(reqwest::header::AUTHORIZATION, token)
            .send()
            .await
            .map_err(UpstreamError::Unreachable)?;
        let resp = reject_non_success(resp).await?;
        resp.json().await.map_err(UpstreamError::Malformed)
    }

    pub async fn port_availability(
        &self,
        api_key: &str,
        pop: &str,
    ) -> Result<Vec<PortAvailability>, UpstreamError> {
        let resp = self
            .http
            .get(format!("{}/locations/{pop}/port-availability", self.base_url))
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(UpstreamError::Unreachable)?;
        let resp = reject_non_success(resp).await?;
        resp.json().await.map_err(UpstreamError::Malformed)
    }

    pub async fn zones(&self, api_key: &str, pop: &str) -> Result<Vec<String>, UpstreamError> {
        let resp = self
            .http
            .get(format!("{}/locations/{pop}/zones", self.base_url))
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(UpstreamError::Unreachable)?;
        let resp = reject_non_success(resp).await?;
        resp.json().await.map_err(UpstreamError::Malformed)
    }
}

/// Turn a non-2xx response into `UpstreamError::Rejected`, preserving the
/// body and surfacing any `message`/`error` field upstream included.
async fn reject_non_success(
    resp: reqwest::Response,
) -> Result<reqwest::Response, UpstreamError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .map(str::to_string);
    Err(UpstreamError::Rejected {
        status: status.as_u16(),
        message,
        body,
    })
}
