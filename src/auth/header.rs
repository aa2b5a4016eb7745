//! Authorization header parsing.

use axum::http::{HeaderMap, header};

/// Get the raw Authorization header value, if present and valid UTF-8.
pub fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::AUTHORIZATION)?.to_str().ok()
}

/// Extract the token from a `Bearer <token>` value.
///
/// The scheme is matched case-insensitively. The token must be non-empty and
/// contain no whitespace.
pub fn parse_bearer(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return None;
    }
    Some(token)
}
