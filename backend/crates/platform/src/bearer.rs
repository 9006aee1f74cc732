//! Bearer Token Transport
//!
//! The only supported token transport is the `Authorization` header with
//! the `Bearer` scheme (RFC 6750). Cookies are never read.

use axum::http::{HeaderMap, HeaderValue, header};

/// Authentication scheme name
pub const BEARER_SCHEME: &str = "Bearer";

/// Why no token could be taken from the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    #[error("Authorization header is missing")]
    Missing,

    #[error("Authorization header is not valid ASCII")]
    NotAscii,

    #[error("Authorization scheme is not Bearer")]
    WrongScheme,

    #[error("Bearer token is empty")]
    Empty,
}

/// Extract the bearer token from request headers
///
/// The scheme is matched case-insensitively; surrounding whitespace around
/// the token is ignored.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(BearerError::Missing)?
        .to_str()
        .map_err(|_| BearerError::NotAscii)?;

    let (scheme, token) = value
        .trim_start()
        .split_once(' ')
        .ok_or(BearerError::WrongScheme)?;

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(BearerError::WrongScheme);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(BearerError::Empty);
    }

    Ok(token)
}

/// `WWW-Authenticate` challenge sent with 401 responses
pub fn www_authenticate_challenge() -> HeaderValue {
    HeaderValue::from_static("Bearer")
}
