// rest/mod.rs — HTTP surface of the gateway.
//
// JSON API under /api, built UI assets on everything else. The session gate
// runs before every non-API request.
//
// Endpoints:
//   GET  /api/auth/check
//   POST /api/auth/login
//   POST /api/auth/logout
//   GET  /api/auth/session
//   GET  /api/health          (HEAD answered automatically with empty body)
//   POST /api/query
//   POST /api/availability
//   GET  /api/customers/{customer_uuid}

pub mod gate;
pub mod routes;

use anyhow::Result;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::info;

use crate::AppContext;

pub async fn serve(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("gateway listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    let api = Router::new()
        .route("/auth/check", get(routes::auth::check))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/session", get(routes::auth::session))
        .route("/health", get(routes::health::health))
        .route("/query", post(routes::query::query))
        .route("/availability", post(routes::availability::availability))
        .route(
            "/customers/{customer_uuid}",
            get(routes::customers::customer),
        );

    let static_dir = &ctx.config.static_dir;
    let assets = ServeDir::new(static_dir)
        .fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .nest("/api", api)
        .fallback_service(assets)
        .layer(middleware::from_fn_with_state(ctx.clone(), gate::session_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
