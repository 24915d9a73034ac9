// rest/routes/customers.rs — authenticated customer lookup passthrough.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use crate::session;
use crate::upstream::UpstreamError;
use crate::AppContext;

/// GET /api/customers/{customer_uuid}. Requires an authenticated session;
/// the stored bearer token goes upstream as the Authorization header.
/// Upstream errors are relayed verbatim — status and body unchanged.
pub async fn customer(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(customer_uuid): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let current = session::session_from_headers(&ctx.codec, &headers);
    let token = match current.token.as_deref() {
        Some(token) if current.is_logged_in => token,
        _ => {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Not authenticated" })),
            ));
        }
    };

    match ctx.upstream.customer(token, &customer_uuid).await {
        Ok(body) => Ok(Json(body)),
        Err(UpstreamError::Rejected { status, body, .. }) => Err((
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            Json(body),
        )),
        Err(e) => {
            error!(err = %e, customer_uuid = %customer_uuid, "customer lookup failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            ))
        }
    }
}
