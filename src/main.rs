use anyhow::{Context as _, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use fabric_gateway::{config::GatewayConfig, rest, AppContext};

#[derive(Parser)]
#[command(
    name = "fabric-gateway",
    about = "HTTP gateway for the fabric chat console",
    version
)]
struct Args {
    /// HTTP server port
    #[arg(long, env = "FABRIC_GATEWAY_PORT")]
    port: Option<u16>,

    /// Bind address (default: 127.0.0.1; use 0.0.0.0 behind a load balancer)
    #[arg(long, env = "FABRIC_GATEWAY_BIND")]
    bind_address: Option<String>,

    /// Path to config.toml (default: ./config.toml)
    #[arg(long, env = "FABRIC_GATEWAY_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "FABRIC_GATEWAY_LOG")]
    log: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "FABRIC_GATEWAY_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = GatewayConfig::load(args.port, args.bind_address, args.config, args.log)
        .context("configuration error")?;

    let _log_guard = setup_logging(&config.log, args.log_file.as_deref(), &config.log_format);

    info!(
        environment = config.environment.as_str(),
        api_base_url = %config.api_base_url,
        webhook_configured = config.webhook_url.is_some(),
        "starting fabric-gateway v{}",
        env!("CARGO_PKG_VERSION")
    );

    let ctx = Arc::new(AppContext::new(config)?);
    rest::serve(ctx).await
}

/// Initialise tracing: pretty or JSON to stdout, plus an optional daily-
/// rotated file writer. Falls back to stdout-only on a bad log path — never
/// panics.
fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("fabric-gateway.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stdout",
                dir.display()
            );
            if use_json {
                tracing_subscriber::fmt().json().with_env_filter(log_level).init();
            } else {
                tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
            }
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().with_writer(non_blocking))
                .init();
        }

        Some(guard)
    } else if use_json {
        tracing_subscriber::fmt().json().with_env_filter(log_level).init();
        None
    } else {
        tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
        None
    }
}
