//! Session tokens: issuing, extracting from request targets, and verifying.

use crate::error::{AuthFailure, Result, ServeError};
use std::hint::black_box;
use subtle::ConstantTimeEq;
use url::Url;

/// Bytes of entropy in a session token (rendered as twice as many hex digits).
pub const TOKEN_BYTES: usize = 16;

const BASE_URL: &str = "http://localhost/";

/// Issue a fresh token: 128 random bits as lowercase hex.
pub fn issue() -> Result<String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    getrandom::fill(&mut bytes).map_err(|e| ServeError::Token(e.to_string()))?;

    Ok(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

/// Compare a candidate against the expected token without leaking where they differ.
pub fn verify(candidate: Option<&str>, expected: &str) -> bool {
    let Some(candidate) = candidate else {
        return false;
    };
    if candidate.is_empty() || expected.is_empty() {
        return false;
    }

    if candidate.len() != expected.len() {
        // Keep the work comparable to a same-length comparison.
        black_box(expected.as_bytes().ct_eq(expected.as_bytes()));
        return false;
    }

    candidate.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Pull the `token` query parameter out of a request target.
///
/// Accepts absolute URLs, origin-form paths (`/sse?token=..`), bare query
/// strings (`?token=..`) and query strings without the leading `?`.
/// Returns `None` when there is no token or the target cannot be parsed.
pub fn extract(raw: &str) -> Option<String> {
    let base = Url::parse(BASE_URL).ok()?;

    let url = if raw.starts_with('?') {
        base.join(&format!("/{raw}"))
    } else if raw.contains("://") {
        Url::parse(raw)
    } else if raw.starts_with('/') {
        base.join(raw)
    } else {
        base.join(&format!("/?{raw}"))
    }
    .ok()?;

    url.query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
}

/// Decide whether a request carrying `candidate` may proceed.
pub fn authorize(candidate: Option<&str>, expected: &str) -> std::result::Result<(), AuthFailure> {
    match candidate {
        None | Some("") => Err(AuthFailure::Missing),
        Some(_) if !verify(candidate, expected) => Err(AuthFailure::Invalid),
        Some(_) => Ok(()),
    }
}
