//! Shared test helpers: spawn the gateway and mock upstream services on
//! random local ports, then drive them over real HTTP with reqwest.

use axum::Router;
use fabric_gateway::{
    config::{Environment, GatewayConfig},
    rest, AppContext,
};
use std::net::SocketAddr;
use std::sync::Arc;

pub const TEST_SECRET: &str = "an-integration-test-secret-32-chars";

/// Bind a router on a random port and serve it in the background.
pub async fn serve_router(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Gateway config pointing at the given mock upstream / webhook.
/// `api_base_url = None` points at a dead port so an unexpected upstream
/// call fails loudly instead of hitting the network.
pub fn test_config(api_base_url: Option<String>, webhook_url: Option<String>) -> GatewayConfig {
    GatewayConfig {
        port: 0,
        bind_address: "127.0.0.1".to_string(),
        log: "error".to_string(),
        log_format: "pretty".to_string(),
        environment: Environment::Development,
        session_secret: TEST_SECRET.to_string(),
        api_base_url: api_base_url.unwrap_or_else(|| "http://127.0.0.1:9".to_string()),
        api_key: Some("test-api-key".to_string()),
        webhook_url,
        static_dir: "public".into(),
        upstream_timeout_secs: 5,
    }
}

/// Start a gateway with the given config. The returned context shares the
/// codec with the running server, so tests can mint and inspect cookies.
pub async fn spawn_gateway(config: GatewayConfig) -> (SocketAddr, Arc<AppContext>) {
    let ctx = Arc::new(AppContext::new(config).unwrap());
    let addr = serve_router(rest::build_router(ctx.clone())).await;
    (addr, ctx)
}

/// HTTP client with redirects disabled so gate redirects are observable.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Pull the session cookie value out of a response's Set-Cookie header.
pub fn session_cookie_from(resp: &reqwest::Response) -> Option<String> {
    let raw = resp.headers().get(reqwest::header::SET_COOKIE)?.to_str().ok()?;
    let (name_value, _) = raw.split_once(';')?;
    let (name, value) = name_value.split_once('=')?;
    (name == fabric_gateway::session::SESSION_COOKIE).then(|| value.to_string())
}
