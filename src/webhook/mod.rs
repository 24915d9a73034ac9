//! Relay to the external workflow-automation webhook that answers free-text
//! queries. The webhook response is a passthrough: the gateway forwards the
//! JSON body as-is (`answer`, plus optional `sources`, `locations`,
//! `includes_live_pricing`).
//!
//! Authentication is optional for this relay: an authenticated caller's
//! payload is enriched with identity fields and a per-request correlation
//! id so downstream conversation logging can stitch turns together. The
//! correlation id carries no replay or idempotency guarantees.

use chrono::Utc;
use serde_json::Value;
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::session::SessionData;

/// Stable user-facing answer shown whenever the relay fails. The chat UI
/// renders this instead of a raw error.
pub const FALLBACK_ANSWER: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("workflow webhook URL is not configured")]
    Unconfigured,
    #[error("webhook returned {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("webhook request failed: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("webhook returned malformed JSON: {0}")]
    Malformed(#[source] reqwest::Error),
}

#[derive(Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    url: Option<String>,
}

impl WebhookClient {
    pub fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            url: config.webhook_url.clone(),
        })
    }

    /// Forward a query, enriched with identity when the session is
    /// authenticated. Fails fast with `Unconfigured` before any network
    /// call when no webhook URL is set.
    pub async fn ask(&self, query: &str, session: &SessionData) -> Result<Value, QueryError> {
        let url = self.url.as_deref().ok_or(QueryError::Unconfigured)?;

        let mut payload = serde_json::json!({ "query": query });
        if session.is_authenticated() {
            // is_authenticated() guarantees user_uuid is present.
            if let Some(user_uuid) = &session.user_uuid {
                payload["user_uuid"] = Value::String(user_uuid.clone());
                payload["session_id"] = Value::String(correlation_id(user_uuid));
            }
            if let Some(customer_uuid) = &session.customer_uuid {
                payload["customer_uuid"] = Value::String(customer_uuid.clone());
            }
        }

        let resp = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(QueryError::Unreachable)?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(QueryError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }
        resp.json().await.map_err(QueryError::Malformed)
    }
}

/// Per-request correlation id: `{user_uuid}-{unix_millis}`. Downstream uses
/// it for conversation logging only; it is never validated or deduplicated.
fn correlation_id(user_uuid: &str) -> String {
    format!("{user_uuid}-{}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_fails_before_any_network_call() {
        let client = WebhookClient {
            http: reqwest::Client::new(),
            url: None,
        };
        let err = client.ask("hello", &SessionData::default()).await.unwrap_err();
        assert!(matches!(err, QueryError::Unconfigured));
    }

    #[test]
    fn correlation_id_is_uuid_plus_millis() {
        let id = correlation_id("u-42");
        let suffix = id.strip_prefix("u-42-").unwrap();
        assert!(suffix.parse::<i64>().unwrap() > 0);
    }
}
