//! Refresh Use Case
//!
//! Exchanges a valid refresh token for a new access token.

use std::sync::Arc;

use platform::token::TokenService;

use crate::domain::repository::UserRepository;
use crate::domain::value_object::UserId;
use crate::error::{AuthError, AuthResult};

/// Refresh output
#[derive(Debug)]
pub struct RefreshOutput {
    pub access_token: String,
    pub expires_in: u64,
}

/// Refresh use case
pub struct RefreshUseCase<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    tokens: Arc<TokenService>,
}

impl<R> RefreshUseCase<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, tokens: Arc<TokenService>) -> Self {
        Self { repo, tokens }
    }

    /// Every failure is `Unauthorized`; the reason is only logged
    pub async fn execute(&self, refresh_token: Option<String>) -> AuthResult<RefreshOutput> {
        let token = refresh_token
            .filter(|t| !t.trim().is_empty())
            .ok_or(AuthError::Unauthorized)?;

        let claims = self.tokens.verify_refresh(token.trim()).map_err(|e| {
            tracing::debug!(reason = %e, "Refresh token rejected");
            AuthError::Unauthorized
        })?;

        let user_id: UserId = claims.sub.parse().map_err(|_| {
            tracing::debug!("Refresh token subject is not a user id");
            AuthError::Unauthorized
        })?;

        // Deleted accounts cannot mint new access tokens
        if self.repo.find_by_id(&user_id).await?.is_none() {
            tracing::debug!(user_id = %user_id, "Refresh for unknown user");
            return Err(AuthError::Unauthorized);
        }

        let access_token = self
            .tokens
            .issue_access(&claims.sub)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(RefreshOutput {
            access_token,
            expires_in: self.tokens.access_ttl().as_secs(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::User;
    use crate::domain::value_object::{email::Email, user_name::UserName};
    use crate::infra::memory::InMemoryUserRepository;
    use platform::password::{ClearTextPassword, CredentialHasher, HasherConfig};
    use platform::token::TokenConfig;

    async fn setup() -> (RefreshUseCase<InMemoryUserRepository>, Arc<TokenService>, User) {
        let repo = InMemoryUserRepository::new();
        let hasher = CredentialHasher::new(HasherConfig::low_cost()).unwrap();
        let user = User::new(
            Email::new("alice@example.com").unwrap(),
            UserName::new("Alice").unwrap(),
            hasher
                .hash(&ClearTextPassword::new("glacier-Trombone-umbrella-47".to_string()).unwrap())
                .unwrap(),
        );
        repo.insert(&user).await.unwrap();

        let tokens = Arc::new(TokenService::new(TokenConfig::new("refresh-test-secret")));
        (RefreshUseCase::new(Arc::new(repo), tokens.clone()), tokens, user)
    }

    #[tokio::test]
    async fn test_refresh_issues_access_token() {
        let (use_case, tokens, user) = setup().await;
        let refresh = tokens.issue_refresh(&user.user_id.to_string()).unwrap();

        let output = use_case.execute(Some(refresh)).await.unwrap();
        let claims = tokens.verify_access(&output.access_token).unwrap();
        assert_eq!(claims.sub, user.user_id.to_string());
    }

    #[tokio::test]
    async fn test_access_token_cannot_refresh() {
        let (use_case, tokens, user) = setup().await;
        let access = tokens.issue_access(&user.user_id.to_string()).unwrap();

        let err = use_case.execute(Some(access)).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn test_refresh_rejections() {
        let (use_case, tokens, _) = setup().await;

        for token in [
            None,
            Some(String::new()),
            Some("garbage".to_string()),
            Some(tokens.issue_refresh("not-a-uuid").unwrap()),
            Some(tokens.issue_refresh(&UserId::new().to_string()).unwrap()),
        ] {
            let err = use_case.execute(token).await.unwrap_err();
            assert!(matches!(err, AuthError::Unauthorized));
        }
    }
}
