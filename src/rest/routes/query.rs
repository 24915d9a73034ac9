// rest/routes/query.rs — free-text query relay to the workflow webhook.
//
// This is the one surface where the UI must never see a raw error: every
// failure carries a displayable fallback `answer` alongside the error field.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::session;
use crate::webhook::{QueryError, FALLBACK_ANSWER};
use crate::AppContext;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct QueryRequest {
    pub query: String,
}

pub async fn query(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(body): Json<QueryRequest>,
) -> Response {
    if body.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Query is required" })),
        )
            .into_response();
    }

    // Authentication is optional here: anonymous callers are served without
    // identity enrichment.
    let current = session::session_from_headers(&ctx.codec, &headers);

    match ctx.webhook.ask(&body.query, &current).await {
        Ok(answer) => {
            info!(authenticated = current.is_authenticated(), "query relayed");
            Json(answer).into_response()
        }
        Err(QueryError::Unconfigured) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "Chat service is not configured",
                "answer": FALLBACK_ANSWER,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(err = %e, "query relay failed");
            let mut envelope = json!({
                "error": "Internal server error",
                "answer": FALLBACK_ANSWER,
            });
            // Technical detail is for development only.
            if !ctx.config.environment.is_production() {
                envelope["debug"] = json!({ "message": e.to_string() });
            }
            (StatusCode::INTERNAL_SERVER_ERROR, Json(envelope)).into_response()
        }
    }
}
