//! Session gate, run once per inbound request before any handler.
//!
//! Two route classes on the page surface:
//!   protected (`/chat...`): anonymous callers are redirected to the login
//!   page with the original path preserved in `?next=` so the UI can resume
//!   the flow after login;
//!   login-only (`/login`): authenticated callers are redirected home.
//!
//! The gate only *reads* the session; a cookie that fails to decode is
//! treated as logged out, never as an error. API routes pass through
//! untouched and do their own auth checks.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::sync::Arc;

use crate::session;
use crate::AppContext;

const LOGIN_PATH: &str = "/login";
const HOME_PATH: &str = "/";
const PROTECTED_PREFIX: &str = "/chat";

pub async fn session_gate(
    State(ctx): State<Arc<AppContext>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if path.starts_with("/api/") {
        return next.run(request).await;
    }

    let current = session::session_from_headers(&ctx.codec, request.headers());

    if path.starts_with(PROTECTED_PREFIX) && !current.is_authenticated() {
        // Preserve path + query so the post-login redirect can resume.
        let original = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or(path);
        let encoded = utf8_percent_encode(original, NON_ALPHANUMERIC);
        return Redirect::temporary(&format!("{LOGIN_PATH}?next={encoded}")).into_response();
    }

    if path == LOGIN_PATH && current.is_authenticated() {
        return Redirect::temporary(HOME_PATH).into_response();
    }

    next.run(request).await
}
