// rest/routes/auth.rs — login, logout, and session status.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use crate::auth::{self, AuthError};
use crate::session;
use crate::AppContext;

/// Append a Set-Cookie header. The cookie strings this service builds are
/// plain ASCII, so a failure here indicates a bug; log it rather than
/// dropping the whole response.
fn append_set_cookie(response: &mut Response, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => error!(err = %e, "failed to build Set-Cookie header"),
    }
}

/// GET /api/auth/check: lightweight poll for the UI. Never errors: a
/// missing or invalid cookie simply reads as logged out.
pub async fn check(State(ctx): State<Arc<AppContext>>, headers: HeaderMap) -> Json<Value> {
    let current = session::session_from_headers(&ctx.codec, &headers);
    Json(json!({
        "isLoggedIn": current.is_authenticated(),
        "user_uuid": current.user_uuid,
    }))
}

// Missing fields deserialize to "" and fail input validation, instead of
// bouncing off the extractor with an unhandled 422.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login: two-step credential exchange; sets the session
/// cookie on success. The response body never includes the bearer token.
pub async fn login(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<LoginRequest>,
) -> Response {
    match auth::login(&ctx.upstream, &body.email, &body.password).await {
        Ok(new_session) => {
            let sealed = match ctx.codec.encode(&new_session) {
                Ok(sealed) => sealed,
                Err(e) => {
                    error!(err = %e, "session encoding failed");
                    return login_failure(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An error occurred during login",
                    );
                }
            };
            let mut response = Json(json!({ "success": true })).into_response();
            append_set_cookie(
                &mut response,
                &session::set_cookie(&sealed, ctx.config.environment.is_production()),
            );
            response
        }
        Err(AuthError::InvalidInput) => {
            login_failure(StatusCode::BAD_REQUEST, "Email and password are required")
        }
        Err(AuthError::UpstreamRejected { status, message }) => login_failure(
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            &message,
        ),
        Err(AuthError::ProfileResolutionFailed) => login_failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Could not retrieve user information",
        ),
        Err(AuthError::Unreachable(e)) => {
            error!(err = %e, "upstream login unreachable");
            login_failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred during login",
            )
        }
    }
}

fn login_failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}

/// POST /api/auth/logout: resets the session to default and clears the
/// cookie. Always succeeds.
pub async fn logout(State(ctx): State<Arc<AppContext>>) -> Response {
    let mut response = Json(json!({ "success": true })).into_response();
    append_set_cookie(
        &mut response,
        &session::clear_cookie(ctx.config.environment.is_production()),
    );
    response
}

/// GET /api/auth/session: full session detail for the UI. 401 when
/// anonymous; decode failures degrade to anonymous.
pub async fn session(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let current = session::session_from_headers(&ctx.codec, &headers);
    if !current.is_authenticated() {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Not authenticated" })),
        ));
    }
    Ok(Json(json!({
        "isLoggedIn": true,
        "user": {
            "token": current.token,
            "user_uuid": current.user_uuid,
            "customer_uuid": current.customer_uuid,
        },
    })))
}
