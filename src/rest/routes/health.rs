use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::AppContext;

/// GET /api/health. axum answers HEAD on this route with an empty body,
/// which covers lightweight existence checks from the load balancer.
pub async fn health(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let uptime = ctx.started_at.elapsed().as_secs();
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime": uptime,
        "environment": ctx.config.environment.as_str(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
