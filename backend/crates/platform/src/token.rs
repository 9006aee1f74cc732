//! Signed Bearer Tokens
//!
//! Stateless HS256 JWTs carrying a subject, issue time, expiry and kind.
//! Nothing is stored server-side; a token is valid until `exp`.
//!
//! ## Failure model
//! Verification never panics on caller-supplied input. Every failure is a
//! [`TokenError`]; signature problems are reported before expiry so an
//! expired forgery is still an [`TokenError::InvalidSignature`].

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default access token lifetime: 15 minutes
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);

/// Default refresh token lifetime: 7 days
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 3600);

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds); invalid from this instant on
    pub exp: i64,
    /// Token kind
    pub typ: TokenKind,
}

/// Token issuance / verification failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is malformed")]
    Malformed,

    /// Well-formed and signed, but the wrong kind for this use
    #[error("Token kind mismatch")]
    WrongKind,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Token service configuration
///
/// The secret is injected once at construction; there is no global key.
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: DEFAULT_ACCESS_TTL,
            refresh_ttl: DEFAULT_REFRESH_TTL,
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Issues and verifies signed tokens
///
/// Keys are derived once; the service is read-only afterwards and safe to
/// share across requests.
///
/// ## Examples
/// ```rust
/// use platform::token::{TokenConfig, TokenService};
///
/// let service = TokenService::new(TokenConfig::new("test-secret"));
/// let token = service.issue_access("user-1").unwrap();
/// let claims = service.verify_access(&token).unwrap();
/// assert_eq!(claims.sub, "user-1");
/// ```
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `verify` itself: no leeway, and `exp == now`
        // already counts as expired
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding: EncodingKey::from_secret(&config.secret),
            decoding: DecodingKey::from_secret(&config.secret),
            validation,
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        }
    }

    /// Issue a token of `kind` for `subject`, valid for `ttl`
    ///
    /// Claims have whole-second resolution, so a fractional `ttl` is
    /// rounded up: 900 ms yields a token that lives for one second.
    pub fn issue(&self, subject: &str, kind: TokenKind, ttl: Duration) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        let ttl_secs = i64::try_from(ceil_secs(ttl)).unwrap_or(i64::MAX);

        let claims = TokenClaims {
            sub: subject.to_string(),
            iat,
            exp: iat.saturating_add(ttl_secs),
            typ: kind,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Short-lived access token
    #[inline]
    pub fn issue_access(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, TokenKind::Access, self.access_ttl)
    }

    /// Long-lived refresh token
    #[inline]
    pub fn issue_refresh(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, TokenKind::Refresh, self.refresh_ttl)
    }

    /// Validate signature, then expiry, and return the claims
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        let claims = data.claims;
        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// [`TokenService::verify`] restricted to access tokens
    pub fn verify_access(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_kind(token, TokenKind::Access)
    }

    /// [`TokenService::verify`] restricted to refresh tokens
    pub fn verify_refresh(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_kind(token, TokenKind::Refresh)
    }

    fn verify_kind(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, TokenError> {
        let claims = self.verify(token)?;
        if claims.typ != kind {
            return Err(TokenError::WrongKind);
        }
        Ok(claims)
    }

    /// Access token lifetime
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }
}

fn ceil_secs(ttl: Duration) -> u64 {
    if ttl.subsec_nanos() > 0 {
        ttl.as_secs().saturating_add(1)
    } else {
        ttl.as_secs()
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}
