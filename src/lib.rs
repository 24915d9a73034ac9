pub mod auth;
pub mod config;
pub mod rest;
pub mod session;
pub mod upstream;
pub mod webhook;

use std::sync::Arc;

use config::GatewayConfig;
use session::SessionCodec;
use upstream::UpstreamClient;
use webhook::WebhookClient;

/// Shared application state handed to every request handler.
///
/// Built once at startup; everything inside is read-only for the life of the
/// process. Per-caller state lives in the encrypted session cookie, never
/// here — the gateway holds no server-side session store.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<GatewayConfig>,
    pub codec: SessionCodec,
    pub upstream: UpstreamClient,
    pub webhook: WebhookClient,
    pub started_at: std::time::Instant,
}

impl AppContext {
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let codec = SessionCodec::new(&config.session_secret)?;
        let upstream = UpstreamClient::new(&config)?;
        let webhook = WebhookClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            codec,
            upstream,
            webhook,
            started_at: std::time::Instant::now(),
        })
    }
}
