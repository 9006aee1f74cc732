//! Login Use Case
//!
//! Verifies credentials and issues an access/refresh token pair.
//!
//! ## Timing
//! Every attempt that reaches the lookup pays for exactly one Argon2
//! verification: against the stored hash when the email is known, against
//! the hasher's dummy hash otherwise. The outcome is only branched on after
//! that work is done, so response time does not reveal whether an account
//! exists.

use std::sync::Arc;

use platform::password::{ClearTextPassword, CredentialHasher};
use platform::token::TokenService;

use crate::application::register::present;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult, FieldError};

/// Login input
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login output
#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

/// Login use case
pub struct LoginUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    hasher: Arc<CredentialHasher>,
    tokens: Arc<TokenService>,
}

impl<R> LoginUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, hasher: Arc<CredentialHasher>, tokens: Arc<TokenService>) -> Self {
        Self {
            repo,
            hasher,
            tokens,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        let (email, password) = match (present(input.email), input.password.filter(|p| !p.is_empty())) {
            (Some(email), Some(password)) => (email, password),
            (email, password) => {
                let mut errors = Vec::new();
                if email.is_none() {
                    errors.push(FieldError::required("email"));
                }
                if password.is_none() {
                    errors.push(FieldError::required("password"));
                }
                return Err(AuthError::Validation(errors));
            }
        };

        // A malformed email cannot belong to an account
        let user = match Email::new(&email) {
            Ok(email) => self.repo.find_by_email(&email).await?,
            Err(_) => None,
        };

        let password = ClearTextPassword::for_verification(password);
        let stored = user.as_ref().map(|u| u.password_hash.clone());
        let hasher = self.hasher.clone();

        let verified = tokio::task::spawn_blocking(move || match stored {
            Some(hash) => hasher.verify(&password, &hash),
            None => hasher.verify_dummy(&password),
        })
        .await?;

        let user = match user {
            Some(user) if verified => user,
            Some(user) => {
                tracing::warn!(user_id = %user.user_id, "Login failed: wrong password");
                return Err(AuthError::InvalidCredentials);
            }
            None => {
                tracing::warn!("Login failed: unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let subject = user.user_id.to_string();
        let access_token = self
            .tokens
            .issue_access(&subject)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        let refresh_token = self
            .tokens
            .issue_refresh(&subject)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(LoginOutput {
            user,
            access_token,
            refresh_token,
            expires_in: self.tokens.access_ttl().as_secs(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::register::{RegisterInput, RegisterUseCase};
    use crate::infra::memory::InMemoryUserRepository;
    use platform::password::HasherConfig;
    use platform::token::TokenConfig;

    const PASSWORD: &str = "glacier-Trombone-umbrella-47";

    async fn setup() -> (LoginUseCase<InMemoryUserRepository>, Arc<TokenService>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let hasher = Arc::new(CredentialHasher::new(HasherConfig::low_cost()).unwrap());
        let tokens = Arc::new(TokenService::new(TokenConfig::new("login-test-secret")));

        RegisterUseCase::new(repo.clone(), hasher.clone())
            .execute(RegisterInput {
                email: Some("alice@example.com".to_string()),
                user_name: Some("Alice".to_string()),
                password: Some(PASSWORD.to_string()),
            })
            .await
            .unwrap();

        (LoginUseCase::new(repo, hasher, tokens.clone()), tokens)
    }

    fn input(email: &str, password: &str) -> LoginInput {
        LoginInput {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_login_issues_token_for_subject() {
        let (use_case, tokens) = setup().await;
        let output = use_case
            .execute(input(" Alice@Example.com ", PASSWORD))
            .await
            .unwrap();

        let claims = tokens.verify_access(&output.access_token).unwrap();
        assert_eq!(claims.sub, output.user.user_id.to_string());
        assert!(tokens.verify_refresh(&output.refresh_token).is_ok());
        assert_eq!(output.expires_in, 15 * 60);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_are_identical() {
        let (use_case, _) = setup().await;

        let wrong = use_case
            .execute(input("alice@example.com", "not-the-password"))
            .await
            .unwrap_err();
        let unknown = use_case
            .execute(input("nobody@example.com", PASSWORD))
            .await
            .unwrap_err();
        let malformed = use_case
            .execute(input("not-an-email", PASSWORD))
            .await
            .unwrap_err();

        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(malformed, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let (use_case, _) = setup().await;
        let err = use_case
            .execute(LoginInput {
                email: Some(" ".to_string()),
                password: None,
            })
            .await
            .unwrap_err();

        let AuthError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.len(), 2);
    }

    #[tokio::test]
    async fn test_weak_policy_not_applied_at_login() {
        let (use_case, _) = setup().await;
        // Too short for registration, still just a wrong password here
        let err = use_case.execute(input("alice@example.com", "x")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_unreadable_stored_hash_is_invalid_credentials() {
        use crate::domain::value_object::user_name::UserName;
        use platform::password::HashedPassword;

        let (use_case, _) = setup().await;
        let user = User::new(
            Email::new("bob@example.com").unwrap(),
            UserName::new("Bob").unwrap(),
            HashedPassword::from_stored("$argon2id$v=19$truncated"),
        );
        use_case.repo.insert(&user).await.unwrap();

        let err = use_case
            .execute(input("bob@example.com", PASSWORD))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}
