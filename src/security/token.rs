//! Time-bound capability tokens.
//!
//! A token is `hex(HMAC-SHA256(secret, "{id}{issued_at}"))`. Nothing is
//! stored: the verifier recomputes the token from the request's id and
//! timestamp and compares in constant time.
//!
//! # Validity window
//!
//! The window is symmetric around `issued_at` so small clock skew in either
//! direction is tolerated. The boundary is inclusive: a token checked exactly
//! `window` seconds from its timestamp is still valid, one second more is not.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Default lifetime of a signed URL, in seconds on either side of issue time.
pub const DEFAULT_VALIDITY_SECS: u64 = 600;

/// Why a candidate token was refused. Never shown to HTTP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenRejection {
    #[error("no signing secret configured")]
    NotConfigured,
    #[error("timestamp outside the validity window")]
    Expired,
    #[error("signature mismatch")]
    BadSignature,
}

impl TokenRejection {
    /// Static label for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::Expired => "expired",
            Self::BadSignature => "bad_signature",
        }
    }
}

/// Sign `id` at `issued_at` (epoch seconds). Returns the lowercase hex digest.
pub fn sign(secret: &str, id: i64, issued_at: i64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(format!("{}{}", id, issued_at).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Check a candidate token, reporting the first reason it fails.
pub fn check(
    secret: &str,
    id: i64,
    issued_at: i64,
    candidate: &str,
    now: i64,
    window_secs: u64,
) -> Result<(), TokenRejection> {
    if secret.is_empty() {
        return Err(TokenRejection::NotConfigured);
    }
    if now.abs_diff(issued_at) > window_secs {
        return Err(TokenRejection::Expired);
    }

    let expected = sign(secret, id, issued_at);
    if bool::from(expected.as_bytes().ct_eq(candidate.as_bytes())) {
        Ok(())
    } else {
        Err(TokenRejection::BadSignature)
    }
}

/// Boolean form of [`check`].
pub fn verify(
    secret: &str,
    id: i64,
    issued_at: i64,
    candidate: &str,
    now: i64,
    window_secs: u64,
) -> bool {
    check(secret, id, issued_at, candidate, now, window_secs).is_ok()
}
