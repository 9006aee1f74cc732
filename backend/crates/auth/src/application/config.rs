//! Application Configuration
//!
//! Configuration for the Auth application layer, read from the environment
//! once at startup.

use std::time::Duration;

use platform::crypto::random_secret;
use platform::password::HasherConfig;
use platform::token::{DEFAULT_ACCESS_TTL, DEFAULT_REFRESH_TTL, TokenConfig};
use thiserror::Error;

/// Signing secret variable; the process refuses to start without it
pub const JWT_SECRET_VAR: &str = "JWT_SECRET";
pub const ACCESS_TOKEN_TTL_VAR: &str = "ACCESS_TOKEN_TTL_SECS";
pub const REFRESH_TOKEN_TTL_VAR: &str = "REFRESH_TOKEN_TTL_SECS";
pub const PASSWORD_PEPPER_VAR: &str = "PASSWORD_PEPPER";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be set to a non-empty value")]
    MissingSecret(&'static str),

    #[error("{name} must be a whole number of seconds (got {value:?})")]
    InvalidDuration { name: &'static str, value: String },
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token signing secret and lifetimes
    pub token: TokenConfig,
    /// Argon2id parameters and optional pepper
    pub hasher: HasherConfig,
}

impl AuthConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(JWT_SECRET_VAR)
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingSecret(JWT_SECRET_VAR))?;

        let access_ttl = parse_ttl(&lookup, ACCESS_TOKEN_TTL_VAR, DEFAULT_ACCESS_TTL)?;
        let refresh_ttl = parse_ttl(&lookup, REFRESH_TOKEN_TTL_VAR, DEFAULT_REFRESH_TTL)?;

        let pepper = lookup(PASSWORD_PEPPER_VAR)
            .filter(|s| !s.is_empty())
            .map(String::into_bytes);

        Ok(Self {
            token: TokenConfig {
                secret: secret.into_bytes(),
                access_ttl,
                refresh_ttl,
            },
            hasher: HasherConfig::default().with_pepper(pepper),
        })
    }

    /// Create config with a random signing secret and cheap hashing
    /// (for development and tests)
    pub fn development() -> Self {
        Self {
            token: TokenConfig::new(random_secret(32)),
            hasher: HasherConfig::low_cost(),
        }
    }

    /// Access token lifetime in seconds
    pub fn access_ttl_secs(&self) -> u64 {
        self.token.access_ttl.as_secs()
    }
}

fn parse_ttl<F>(lookup: &F, name: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidDuration { name, value }),
    }
}
