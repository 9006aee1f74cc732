//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Registration with email, username and password
//! - Login by email, returning an access/refresh token pair
//! - Access token refresh
//! - Bearer-token gate for protected routes (`require_auth` + `AuthContext`)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Weak passwords rejected at registration by zxcvbn score
//! - Login failures indistinguishable by body and by timing
//! - Stateless HS256 tokens; 15 minute access, 7 day refresh by default

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::{AuthConfig, ConfigError};
pub use error::{AuthError, AuthResult, FieldError};
pub use infra::{memory::InMemoryUserRepository, postgres::PgUserRepository};
pub use presentation::handlers::AuthAppState;
pub use presentation::middleware::{AuthContext, require_auth};
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
