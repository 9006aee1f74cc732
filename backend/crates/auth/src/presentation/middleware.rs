//! Auth Middleware
//!
//! Gate for protected routes. A request is `Authenticated` only after its
//! bearer token has been extracted, verified as an access token, and its
//! subject parsed as a user id. Every other outcome is a 401 with a
//! generic body; the precise reason is logged at debug level.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

use platform::bearer::extract_bearer_token;
use platform::token::TokenService;

use crate::domain::value_object::UserId;
use crate::error::{AuthError, AuthResult};

/// Identity of the caller, valid for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: UserId,
}

/// Authenticate a request from its headers
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> AuthResult<AuthContext> {
    let token = extract_bearer_token(headers).map_err(|e| {
        tracing::debug!(reason = %e, "Request rejected: no bearer token");
        AuthError::Unauthorized
    })?;

    let claims = tokens.verify_access(token).map_err(|e| {
        tracing::debug!(reason = %e, "Request rejected: token verification failed");
        AuthError::Unauthorized
    })?;

    let user_id = claims.sub.parse::<UserId>().map_err(|_| {
        tracing::debug!("Request rejected: token subject is not a user id");
        AuthError::Unauthorized
    })?;

    Ok(AuthContext { user_id })
}

/// Middleware that requires a valid access token
///
/// Use with `axum::middleware::from_fn_with_state(tokens, require_auth)`.
pub async fn require_auth(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let context = authenticate(req.headers(), &tokens)?;
    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    /// Rejects when [`require_auth`] did not run for this route
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or(AuthError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};
    use platform::token::{TokenConfig, TokenKind};
    use std::time::Duration;

    fn tokens() -> TokenService {
        TokenService::new(TokenConfig::new("middleware-test-secret"))
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_authenticate_valid_token() {
        let tokens = tokens();
        let user_id = UserId::new();
        let token = tokens.issue_access(&user_id.to_string()).unwrap();

        let context = authenticate(&bearer(&token), &tokens).unwrap();
        assert_eq!(context.user_id, user_id);
    }

    #[test]
    fn test_authenticate_is_idempotent() {
        let tokens = tokens();
        let token = tokens.issue_access(&UserId::new().to_string()).unwrap();
        let headers = bearer(&token);

        let first = authenticate(&headers, &tokens).unwrap();
        let second = authenticate(&headers, &tokens).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_authenticate_rejections() {
        let tokens = tokens();
        let other = TokenService::new(TokenConfig::new("some-other-secret"));
        let subject = UserId::new().to_string();

        let cases = [
            HeaderMap::new(),
            bearer("not.a.token"),
            bearer(&other.issue_access(&subject).unwrap()),
            bearer(&tokens.issue_refresh(&subject).unwrap()),
            bearer(
                &tokens
                    .issue(&subject, TokenKind::Access, Duration::ZERO)
                    .unwrap(),
            ),
            bearer(&tokens.issue_access("not-a-uuid").unwrap()),
        ];

        for headers in &cases {
            assert!(matches!(
                authenticate(headers, &tokens),
                Err(AuthError::Unauthorized)
            ));
        }
    }
}
