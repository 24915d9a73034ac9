//! Encrypted session cookie codec.
//!
//! The cookie *is* the session; there is no server-side store. The payload
//! is ChaCha20-Poly1305-sealed with a key derived from the configured
//! `SESSION_SECRET` via HKDF-SHA256, then base64url-nopad encoded as
//! `nonce_12 || ciphertext`. An expiry timestamp is sealed inside the
//! payload so a replayed cookie older than the max-age is rejected even
//! if the browser kept it around.
//!
//! Decode failures are typed (`SessionDecodeError`) and left to the caller:
//! the gate and the auth endpoints collapse every failure to the logged-out
//! default, which is the deliberate fail-safe policy for this service.
//! Revocation is logout or key rotation only; compromise of the secret
//! compromises all outstanding sessions.

use anyhow::{anyhow, Context as _, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use chrono::Utc;
use hkdf::Hkdf;
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// Single cookie name used across the whole service.
pub const SESSION_COOKIE: &str = "fabric-session";

/// Cookie and sealed-payload lifetime: one week.
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

/// HKDF info string; bump the suffix when the sealed format changes.
const KEY_INFO: &[u8] = b"fabric-gateway-session-v1";

const NONCE_LEN: usize = 12;

// ─── Session data ─────────────────────────────────────────────────────────────

/// Everything the gateway knows about a caller.
///
/// Invariant: `token` and `user_uuid` are both present or both absent, and
/// `is_logged_in = true` implies both are present. `authenticated()` is the
/// only constructor that produces a logged-in value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub is_logged_in: bool,
    /// Bearer credential for the provisioning API. Stored inside the sealed
    /// cookie; the login response never echoes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_uuid: Option<String>,
}

impl SessionData {
    /// A fully resolved, logged-in session.
    pub fn authenticated(
        token: impl Into<String>,
        user_uuid: impl Into<String>,
        customer_uuid: Option<String>,
    ) -> Self {
        Self {
            is_logged_in: true,
            token: Some(token.into()),
            user_uuid: Some(user_uuid.into()),
            customer_uuid,
        }
    }

    /// True only when the logged-in invariant holds in full.
    pub fn is_authenticated(&self) -> bool {
        self.is_logged_in && self.token.is_some() && self.user_uuid.is_some()
    }
}

/// What actually gets sealed: the session plus its absolute expiry.
#[derive(Serialize, Deserialize)]
struct SealedSession {
    exp: i64,
    #[serde(flatten)]
    session: SessionData,
}

// ─── Decode errors ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum SessionDecodeError {
    #[error("cookie value is not valid base64")]
    Encoding,
    #[error("cookie payload too short")]
    Truncated,
    #[error("cookie failed authentication")]
    Crypto,
    #[error("sealed payload is not a valid session")]
    Malformed,
    #[error("session expired")]
    Expired,
}

// ─── Codec ────────────────────────────────────────────────────────────────────

/// Pure encode/decode over the session secret. Cheap to clone; the cipher is
/// derived once at startup.
#[derive(Clone)]
pub struct SessionCodec {
    cipher: ChaCha20Poly1305,
}

impl SessionCodec {
    pub fn new(secret: &str) -> Result<Self> {
        let hk = Hkdf::<Sha256>::new(None, secret.as_bytes());
        let mut okm = [0u8; 32];
        hk.expand(KEY_INFO, &mut okm)
            .map_err(|_| anyhow!("HKDF expand failed"))?;
        Ok(Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(&okm)),
        })
    }

    /// Seal a session into a cookie value valid for [`SESSION_MAX_AGE_SECS`].
    pub fn encode(&self, session: &SessionData) -> Result<String> {
        self.encode_at(session, Utc::now().timestamp() + SESSION_MAX_AGE_SECS)
    }

    fn encode_at(&self, session: &SessionData, exp: i64) -> Result<String> {
        let sealed = SealedSession {
            exp,
            session: session.clone(),
        };
        let plaintext = serde_json::to_vec(&sealed).context("session serialization failed")?;

        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let ct = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_ref())
            .map_err(|_| anyhow!("AEAD encrypt failed"))?;

        let mut payload = nonce.to_vec();
        payload.extend_from_slice(&ct);
        Ok(URL_SAFE_NO_PAD.encode(payload))
    }

    /// Open a cookie value. Callers decide what a failure means; for every
    /// route in this service the answer is "treat as logged out".
    pub fn decode(&self, value: &str) -> Result<SessionData, SessionDecodeError> {
        self.decode_at(value, Utc::now().timestamp())
    }

    fn decode_at(&self, value: &str, now: i64) -> Result<SessionData, SessionDecodeError> {
        let data = URL_SAFE_NO_PAD
            .decode(value)
            .map_err(|_| SessionDecodeError::Encoding)?;
        if data.len() < NONCE_LEN {
            return Err(SessionDecodeError::Truncated);
        }
        let (nonce, ct) = data.split_at(NONCE_LEN);

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ct)
            .map_err(|_| SessionDecodeError::Crypto)?;

        let sealed: SealedSession =
            serde_json::from_slice(&plaintext).map_err(|_| SessionDecodeError::Malformed)?;
        if sealed.exp <= now {
            return Err(SessionDecodeError::Expired);
        }
        Ok(sealed.session)
    }
}

// ─── Cookie plumbing ──────────────────────────────────────────────────────────

/// `Set-Cookie` value for a sealed session. `Secure` is appended only when
/// serving over TLS (production), matching the environment flag.
pub fn set_cookie(sealed: &str, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{SESSION_COOKIE}={sealed}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_MAX_AGE_SECS}{secure}"
    )
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_cookie(secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{secure}")
}

/// Pull the raw session cookie value out of a request's headers, if any.
pub fn cookie_value(headers: &axum::http::HeaderMap) -> Option<&str> {
    let raw = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    for part in raw.split(';') {
        let mut pieces = part.trim().splitn(2, '=');
        let key = pieces.next()?.trim();
        let value = pieces.next()?.trim();
        if key == SESSION_COOKIE && !value.is_empty() {
            return Some(value);
        }
    }
    None
}

/// Decode the session carried by a request, collapsing every failure mode
/// (no cookie, tampering, expiry, wrong key) to the logged-out default.
pub fn session_from_headers(codec: &SessionCodec, headers: &axum::http::HeaderMap) -> SessionData {
    match cookie_value(headers) {
        Some(value) => match codec.decode(value) {
            Ok(session) => session,
            Err(e) => {
                tracing::debug!(err = %e, "session cookie rejected, treating as logged out");
                SessionData::default()
            }
        },
        None => SessionData::default(),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
