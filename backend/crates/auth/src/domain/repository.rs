//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::user::User;
use crate::domain::value_object::{UserId, email::Email};
use crate::error::AuthResult;

/// Account directory
///
/// Email uniqueness is enforced by `insert` atomically; callers never
/// check-then-insert.
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Persist a new user, failing with `AuthError::DuplicateEmail` if the
    /// email is already registered
    async fn insert(&self, user: &User) -> AuthResult<()>;

    /// Find user by (normalized) email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;
}
