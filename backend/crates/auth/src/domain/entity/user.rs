//! User Entity
//!
//! An account: identity, profile and password hash in one record.

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;

use crate::domain::value_object::{
    UserId, email::Email, user_name::UserName, user_role::UserRole,
};

/// User entity
///
/// `password_hash` never leaves the server: this type is not `Serialize`
/// and its `Debug` output redacts the hash.
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Login identifier (unique, lowercased)
    pub email: Email,
    /// Display name
    pub user_name: UserName,
    /// Argon2id PHC string
    pub password_hash: HashedPassword,
    /// Role (User, Admin)
    pub user_role: UserRole,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the default role
    pub fn new(email: Email, user_name: UserName, password_hash: HashedPassword) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            email,
            user_name,
            password_hash,
            user_role: UserRole::default(),
            created_at: now,
            updated_at: now,
        }
    }
}
