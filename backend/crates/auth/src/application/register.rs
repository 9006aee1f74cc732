//! Register Use Case
//!
//! Creates a new account. No token is issued; the client logs in next.

use std::sync::Arc;

use platform::password::{ClearTextPassword, CredentialHasher};
use platform::strength;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{UserId, email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult, FieldError};

/// Register input; absent fields are reported, not rejected by the parser
pub struct RegisterInput {
    pub email: Option<String>,
    pub user_name: Option<String>,
    pub password: Option<String>,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    pub user_id: UserId,
    pub user_name: UserName,
    pub email: Email,
}

/// Register use case
pub struct RegisterUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    hasher: Arc<CredentialHasher>,
}

impl<R> RegisterUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, hasher: Arc<CredentialHasher>) -> Self {
        Self { repo, hasher }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let (email, user_name, password) = validate(input)?;

        let report = strength::score(&password, &[email.as_str(), user_name.as_str()]);
        if !report.is_acceptable() {
            tracing::debug!(level = report.level, "Registration rejected: weak password");
            return Err(AuthError::WeakPassword(report));
        }

        let hasher = self.hasher.clone();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

        let user = User::new(email, user_name, password_hash);
        self.repo.insert(&user).await?;

        tracing::info!(user_id = %user.user_id, "User registered");

        Ok(RegisterOutput {
            user_id: user.user_id,
            user_name: user.user_name,
            email: user.email,
        })
    }
}

/// Check every field and report all problems at once
fn validate(input: RegisterInput) -> AuthResult<(Email, UserName, ClearTextPassword)> {
    let mut errors = Vec::new();

    let email = match present(input.email) {
        None => {
            errors.push(FieldError::required("email"));
            None
        }
        Some(raw) => Email::new(raw)
            .map_err(|e| errors.push(FieldError::new("email", e.message())))
            .ok(),
    };

    let user_name = match present(input.user_name) {
        None => {
            errors.push(FieldError::required("username"));
            None
        }
        Some(raw) => UserName::new(raw)
            .map_err(|e| errors.push(FieldError::new("username", e.to_string())))
            .ok(),
    };

    let password = match input.password.filter(|p| !p.is_empty()) {
        None => {
            errors.push(FieldError::required("password"));
            None
        }
        Some(raw) => ClearTextPassword::new(raw)
            .map_err(|e| errors.push(FieldError::new("password", e.to_string())))
            .ok(),
    };

    match (email, user_name, password) {
        (Some(email), Some(user_name), Some(password)) if errors.is_empty() => {
            Ok((email, user_name, password))
        }
        _ => Err(AuthError::Validation(errors)),
    }
}

/// `None` for absent or blank values
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
