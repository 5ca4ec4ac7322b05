//! Bearer token authentication for inbound send requests.

use axum::http::{header::AUTHORIZATION, HeaderMap};

/// Pull the token out of an `Authorization: Bearer <token>` header.
///
/// The token is the second whitespace-separated segment; anything after it
/// is ignored. Returns `None` when the header is absent, not valid UTF-8,
/// uses another scheme, or has no token segment.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    parts.next()
}

/// `true` when the request carries exactly the configured key.
pub fn is_authorized(headers: &HeaderMap, api_key: &str) -> bool {
    !api_key.is_empty() && bearer_token(headers) == Some(api_key)
}
