//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Library errors (argon2, jsonwebtoken, sqlx codes) are translated into
//! these variants where they occur; handlers only ever see [`AuthError`].

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::PasswordHashError;
use platform::strength::StrengthReport;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// `field` was absent or blank
    pub fn required(field: &'static str) -> Self {
        Self::new(field, format!("{} is required", field))
    }
}

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more request fields are missing or malformed
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Password passed the policy but is too guessable
    #[error("Password is too weak")]
    WeakPassword(StrengthReport),

    /// Email already registered
    #[error("Email already exists")]
    DuplicateEmail,

    /// Unknown email or wrong password; the two are never distinguished
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, expired or forged bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated subject no longer exists
    #[error("User not found")]
    UserNotFound,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::WeakPassword(_) | AuthError::DuplicateEmail => {
                StatusCode::BAD_REQUEST
            }
            AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) | AuthError::WeakPassword(_) | AuthError::DuplicateEmail => {
                ErrorKind::BadRequest
            }
            AuthError::InvalidCredentials | AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side details stay in the logs; the client only gets the kind.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Validation(errors) => AppError::bad_request(self.to_string())
                .with_extension("errors", json!(errors)),
            AuthError::WeakPassword(report) => {
                let mut err = AppError::bad_request(self.to_string())
                    .with_action("Choose a longer or less predictable password")
                    .with_extension("level", json!(report.level))
                    .with_extension("suggestions", json!(report.suggestions));
                if let Some(warning) = &report.warning {
                    err = err.with_extension("warning", json!(warning));
                }
                err
            }
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::new(self.kind(), "Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();

        let challenge = self.status_code() == StatusCode::UNAUTHORIZED;
        let mut response = self.to_app_error().into_response();
        if challenge {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                platform::bearer::www_authenticate_challenge(),
            );
        }
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        response
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::Internal(format!("Blocking task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::Validation(vec![]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::DuplicateEmail.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_problem_lists_fields() {
        let err = AuthError::Validation(vec![
            FieldError::required("email"),
            FieldError::new("password", "too short"),
        ]);
        let problem = err.to_app_error().to_problem();

        assert_eq!(problem["status"], 400);
        assert_eq!(problem["errors"][0]["field"], "email");
        assert_eq!(problem["errors"][0]["message"], "email is required");
        assert_eq!(problem["errors"][1]["field"], "password");
    }

    #[test]
    fn test_weak_password_problem_has_feedback() {
        let err = AuthError::WeakPassword(StrengthReport {
            level: 1,
            warning: Some("This is a very common password.".to_string()),
            suggestions: vec!["Add another word or two.".to_string()],
        });
        let problem = err.to_app_error().to_problem();

        assert_eq!(problem["level"], 1);
        assert_eq!(problem["warning"], "This is a very common password.");
        assert_eq!(problem["suggestions"][0], "Add another word or two.");
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = AuthError::Internal("argon2 exploded at 0xdeadbeef".into());
        let problem = err.to_app_error().to_problem();
        assert!(!problem.to_string().contains("deadbeef"));
    }

    #[test]
    fn test_unauthorized_response_has_challenge() {
        let response = AuthError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );

        let response = AuthError::DuplicateEmail.into_response();
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
