//! Gateway configuration.
//!
//! Priority, highest to lowest: CLI / env var  >  config.toml  >  built-in
//! default. Every value is resolved once at startup and the resulting
//! [`GatewayConfig`] is read-only for the life of the process; no component
//! reads ambient globals.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BIND: &str = "127.0.0.1";
const DEFAULT_API_BASE_URL: &str = "https://api.packetfabric.com/v2";
const DEFAULT_STATIC_DIR: &str = "public";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Sealed-cookie security floor; a shorter secret fails startup.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

// ─── Environment flag ─────────────────────────────────────────────────────────

/// Runtime mode. Controls the cookie `Secure` attribute, whether error
/// envelopes carry debug fields, and the `environment` field of /api/health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SESSION_SECRET is required")]
    MissingSecret,
    #[error("SESSION_SECRET must be at least {MIN_SESSION_SECRET_LEN} characters")]
    WeakSecret,
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `config.toml` — all fields are optional overrides.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// HTTP server port (default: 8080).
    port: Option<u16>,
    /// Bind address (default: "127.0.0.1"; use "0.0.0.0" behind a load balancer).
    bind_address: Option<String>,
    /// Log level filter string, e.g. "debug", "info,fabric_gateway=trace".
    log: Option<String>,
    /// Log output format: "pretty" (default) | "json" (structured for log aggregators).
    log_format: Option<String>,
    /// Runtime mode: "development" (default) | "production".
    environment: Option<String>,
    /// Session cookie encryption secret. Prefer the SESSION_SECRET env var.
    session_secret: Option<String>,
    /// Provisioning API base URL.
    api_base_url: Option<String>,
    /// Service API key for unauthenticated availability lookups.
    api_key: Option<String>,
    /// Workflow-automation webhook URL. The query relay returns 503 without it.
    webhook_url: Option<String>,
    /// Directory of built UI assets served on non-API routes.
    static_dir: Option<PathBuf>,
    /// Per-call timeout for upstream HTTP requests, in seconds (default: 30).
    upstream_timeout_secs: Option<u64>,
}

fn load_toml(path: &Path) -> Option<TomlConfig> {
    let contents = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml, using defaults");
            None
        }
    }
}

// ─── GatewayConfig ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub bind_address: String,
    pub log: String,
    pub log_format: String,
    pub environment: Environment,
    /// Key material for the session codec (SESSION_SECRET env var).
    pub session_secret: String,
    /// Provisioning API base URL, no trailing slash (FABRIC_API_URL env var).
    pub api_base_url: String,
    /// Service key for availability lookups (FABRIC_API_KEY env var).
    /// When absent the availability relay answers 503.
    pub api_key: Option<String>,
    /// Workflow webhook URL (WORKFLOW_WEBHOOK_URL env var).
    /// When absent the query relay answers 503 without attempting a call.
    pub webhook_url: Option<String>,
    /// UI asset directory served on non-API routes (FABRIC_GATEWAY_STATIC_DIR).
    pub static_dir: PathBuf,
    pub upstream_timeout_secs: u64,
}

/// Env-var snapshot, captured once so resolution itself stays pure (and
/// testable without touching process environment).
#[derive(Default)]
struct EnvOverrides {
    session_secret: Option<String>,
    api_base_url: Option<String>,
    api_key: Option<String>,
    webhook_url: Option<String>,
    environment: Option<String>,
    log_format: Option<String>,
    static_dir: Option<String>,
}

impl EnvOverrides {
    fn capture() -> Self {
        let var = |k: &str| std::env::var(k).ok().filter(|v| !v.is_empty());
        Self {
            session_secret: var("SESSION_SECRET"),
            api_base_url: var("FABRIC_API_URL"),
            api_key: var("FABRIC_API_KEY"),
            webhook_url: var("WORKFLOW_WEBHOOK_URL"),
            environment: var("FABRIC_GATEWAY_ENV"),
            log_format: var("FABRIC_GATEWAY_LOG_FORMAT"),
            static_dir: var("FABRIC_GATEWAY_STATIC_DIR"),
        }
    }
}

impl GatewayConfig {
    /// Build config from CLI args, env vars, and an optional TOML file.
    /// Fails fast when the session secret is absent or too short.
    pub fn load(
        port: Option<u16>,
        bind_address: Option<String>,
        config_path: Option<PathBuf>,
        log: Option<String>,
    ) -> Result<Self, ConfigError> {
        let path = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));
        let toml = load_toml(&path).unwrap_or_default();
        Self::resolve(port, bind_address, log, toml, EnvOverrides::capture())
    }

    fn resolve(
        port: Option<u16>,
        bind_address: Option<String>,
        log: Option<String>,
        toml: TomlConfig,
        env: EnvOverrides,
    ) -> Result<Self, ConfigError> {
        let session_secret = env
            .session_secret
            .or(toml.session_secret)
            .ok_or(ConfigError::MissingSecret)?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::WeakSecret);
        }

        let api_base_url = env
            .api_base_url
            .or(toml.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let environment = Environment::parse(
            &env.environment
                .or(toml.environment)
                .unwrap_or_default(),
        );

        Ok(Self {
            port: port.or(toml.port).unwrap_or(DEFAULT_PORT),
            bind_address: bind_address
                .or(toml.bind_address)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            log: log.or(toml.log).unwrap_or_else(|| "info".to_string()),
            log_format: env
                .log_format
                .or(toml.log_format)
                .unwrap_or_else(|| "pretty".to_string()),
            environment,
            session_secret,
            api_base_url,
            api_key: env.api_key.or(toml.api_key),
            webhook_url: env.webhook_url.or(toml.webhook_url),
            static_dir: env
                .static_dir
                .map(PathBuf::from)
                .or(toml.static_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            upstream_timeout_secs: toml
                .upstream_timeout_secs
                .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        })
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
