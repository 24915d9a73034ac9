//! Credential exchange against the upstream identity API.
//!
//! Login is a two-step relay: exchange credentials for a bearer token, then
//! resolve the stable user identifier by listing users with the new token
//! and scanning for the login email (exact, case-sensitive, matching
//! observed upstream behavior). "Authenticated but unidentifiable" is a hard
//! failure: the caller gets `ProfileResolutionFailed` and no cookie is set.

use tracing::{info, warn};

use crate::session::SessionData;
use crate::upstream::{UpstreamClient, UpstreamError};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Rejected before any network call.
    #[error("email and password are required")]
    InvalidInput,
    /// Upstream refused the credentials; `status` is relayed to the caller.
    #[error("{message}")]
    UpstreamRejected { status: u16, message: String },
    /// Credentials were valid but the user list held no usable match.
    #[error("could not retrieve user information")]
    ProfileResolutionFailed,
    /// Transport-level failure talking to upstream.
    #[error("login request to upstream failed")]
    Unreachable(#[source] UpstreamError),
}

/// Full login flow. On success the returned session is ready to seal into
/// the cookie; the bearer token never appears in the login response.
pub async fn login(
    upstream: &UpstreamClient,
    email: &str,
    password: &str,
) -> Result<SessionData, AuthError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::InvalidInput);
    }

    let grant = upstream.login(email, password).await.map_err(|e| match e {
        UpstreamError::Rejected { status, message, .. } => AuthError::UpstreamRejected {
            status,
            message: message.unwrap_or_else(|| "Login failed".to_string()),
        },
        other => AuthError::Unreachable(other),
    })?;

    // Upstream issues a token but no user identifier; resolve it by scanning
    // the user list. Any failure here is profile resolution, not auth.
    let users = upstream.list_users(&grant.token).await.map_err(|e| {
        warn!(err = %e, "user-list lookup failed after successful login");
        AuthError::ProfileResolutionFailed
    })?;

    let matched = users
        .iter()
        .find(|u| u.email == email)
        .and_then(|u| u.uuid.clone().map(|uuid| (uuid, u.customer_uuid.clone())));

    match matched {
        Some((user_uuid, customer_uuid)) => {
            info!(user_uuid = %user_uuid, "login succeeded");
            Ok(SessionData::authenticated(grant.token, user_uuid, customer_uuid))
        }
        None => {
            warn!("no user-list entry matched the login email");
            Err(AuthError::ProfileResolutionFailed)
        }
    }
}
