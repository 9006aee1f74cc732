//! Password Hashing and Verification
//!
//! NIST SP 800-63B compliant password handling with:
//! - Argon2id hashing with fixed, explicit cost parameters
//! - Zeroization of clear text and peppered buffers
//! - Constant-time comparison (inside `argon2`)
//! - A precomputed dummy hash so "unknown account" costs the same as
//!   "wrong password"
//!
//! ## Security Features
//! - Memory-hard hashing prevents GPU/ASIC attacks
//! - Random 128-bit salt per hash, embedded in the PHC string
//! - Optional pepper (application-wide secret) appended before hashing

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::random_bytes;

// ============================================================================
// Constants (NIST SP 800-63B compliant)
// ============================================================================

/// Minimum password length (NIST: SHALL be at least 8)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (NIST: SHOULD permit at least 64)
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    /// Control characters other than space, tab and newline
    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Argon2 parameters rejected
    #[error("Invalid hasher parameters: {0}")]
    InvalidParams(String),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone`
/// - Debug output is redacted
///
/// ## Examples
/// ```rust
/// use platform::password::ClearTextPassword;
///
/// let password = ClearTextPassword::new("my_secure_password".to_string()).unwrap();
/// assert_eq!(password.char_count(), 18);
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new clear text password for a credential that is being set
    ///
    /// Validates against NIST SP 800-63B requirements:
    /// - Minimum 8 characters
    /// - Maximum 128 characters
    /// - No control characters
    /// - Not empty/whitespace only
    ///
    /// Unicode is normalized using NFKC before validation.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let password = Self::for_verification(raw);
        password.check_policy()?;
        Ok(password)
    }

    /// Wrap a password that is only going to be compared against a hash
    ///
    /// Normalizes like [`ClearTextPassword::new`] but applies no policy:
    /// a login attempt must reach the hasher whatever it contains.
    pub fn for_verification(raw: String) -> Self {
        let mut raw = raw;
        let normalized: String = raw.nfkc().collect();
        raw.zeroize();
        Self(normalized)
    }

    fn check_policy(&self) -> Result<(), PasswordPolicyError> {
        if self.0.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // NIST: count Unicode code points, not bytes
        let char_count = self.char_count();

        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if self
            .0
            .chars()
            .any(|ch| ch.is_control() && ch != ' ' && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        Ok(())
    }

    /// Number of Unicode code points after normalization
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
///
/// The PHC string carries algorithm, version, parameters, salt and hash,
/// so verification never depends on the hasher's current settings.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Wrap a stored value without parsing it
    ///
    /// For rows read back from storage: an unreadable value is kept so that
    /// [`CredentialHasher::verify`] can reject it like any wrong password.
    pub fn from_stored(s: impl Into<String>) -> Self {
        Self { hash: s.into() }
    }

    /// Whether the value parses as a PHC string
    pub fn is_well_formed(&self) -> bool {
        PasswordHash::new(&self.hash).is_ok()
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Credential Hasher
// ============================================================================

/// Argon2id cost parameters and optional pepper
#[derive(Clone)]
pub struct HasherConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Lanes
    pub parallelism: u32,
    /// Application-wide secret appended to every password
    pub pepper: Option<Vec<u8>>,
}

impl Default for HasherConfig {
    /// OWASP recommended Argon2id parameters: m=19456 (19 MiB), t=2, p=1
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
            pepper: None,
        }
    }
}

impl HasherConfig {
    /// Cheap parameters for tests and local development only
    pub fn low_cost() -> Self {
        Self {
            memory_kib: 1_024,
            iterations: 1,
            parallelism: 1,
            pepper: None,
        }
    }

    pub fn with_pepper(mut self, pepper: Option<Vec<u8>>) -> Self {
        self.pepper = pepper;
        self
    }
}

impl fmt::Debug for HasherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HasherConfig")
            .field("memory_kib", &self.memory_kib)
            .field("iterations", &self.iterations)
            .field("parallelism", &self.parallelism)
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// One-way credential hasher
///
/// Built once at startup and shared. Holds a dummy hash computed with the
/// same parameters as real hashes, used by [`CredentialHasher::verify_dummy`].
///
/// ## Examples
/// ```rust
/// use platform::password::{ClearTextPassword, CredentialHasher, HasherConfig};
///
/// let hasher = CredentialHasher::new(HasherConfig::low_cost()).unwrap();
/// let password = ClearTextPassword::new("my_secure_password".to_string()).unwrap();
/// let hashed = hasher.hash(&password).unwrap();
///
/// assert!(hasher.verify(&password, &hashed));
/// ```
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    pepper: Option<Zeroizing<Vec<u8>>>,
    dummy: HashedPassword,
}

impl CredentialHasher {
    pub fn new(config: HasherConfig) -> Result<Self, PasswordHashError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))?;

        let mut hasher = Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            pepper: config.pepper.clone().map(Zeroizing::new),
            dummy: HashedPassword {
                hash: String::new(),
            },
        };

        // Nobody knows this password, so the dummy never verifies
        let dummy_secret = Zeroizing::new(random_bytes(32));
        hasher.dummy = hasher.hash_bytes(&dummy_secret)?;

        Ok(hasher)
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        let peppered = self.peppered(password);
        self.hash_bytes(&peppered)
    }

    /// Verify a password against a stored hash
    ///
    /// Re-derives with the salt and parameters embedded in `hashed`;
    /// `argon2` compares the outputs in constant time. A malformed hash
    /// yields `false` after a full run against the dummy hash.
    pub fn verify(&self, password: &ClearTextPassword, hashed: &HashedPassword) -> bool {
        let parsed_hash = match PasswordHash::new(&hashed.hash) {
            Ok(h) => h,
            Err(_) => {
                tracing::warn!("Stored password hash is not a valid PHC string");
                let _ = self.verify_dummy(password);
                return false;
            }
        };

        let peppered = self.peppered(password);
        self.argon2
            .verify_password(&peppered, &parsed_hash)
            .is_ok()
    }

    /// Run a full verification against the dummy hash
    ///
    /// Costs the same as [`CredentialHasher::verify`] against a real hash.
    pub fn verify_dummy(&self, password: &ClearTextPassword) -> bool {
        self.verify(password, &self.dummy)
    }

    fn hash_bytes(&self, bytes: &[u8]) -> Result<HashedPassword, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(bytes, &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }

    fn peppered(&self, password: &ClearTextPassword) -> Zeroizing<Vec<u8>> {
        let mut combined = Zeroizing::new(password.as_bytes().to_vec());
        if let Some(pepper) = &self.pepper {
            combined.extend_from_slice(pepper);
        }
        combined
    }
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", self.argon2.params())
            .field("peppered", &self.pepper.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::LazyLock;

    static SHARED: LazyLock<CredentialHasher> =
        LazyLock::new(|| CredentialHasher::new(HasherConfig::low_cost()).unwrap());

    fn hasher() -> CredentialHasher {
        CredentialHasher::new(HasherConfig::low_cost()).unwrap()
    }

    fn pw(s: &str) -> ClearTextPassword {
        ClearTextPassword::for_verification(s.to_string())
    }

    #[test]
    fn test_password_too_short() {
        let result = ClearTextPassword::new("short".to_string());
        assert!(matches!(result, Err(PasswordPolicyError::TooShort { .. })));
    }

    #[test]
    fn test_password_too_long() {
        let long_password = "a".repeat(MAX_PASSWORD_LENGTH + 1);
        let result = ClearTextPassword::new(long_password);
        assert!(matches!(result, Err(PasswordPolicyError::TooLong { .. })));
    }

    #[test]
    fn test_password_whitespace_only() {
        let result = ClearTextPassword::new("        ".to_string());
        assert!(matches!(
            result,
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
        assert!(matches!(
            ClearTextPassword::new(String::new()),
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
    }

    #[test]
    fn test_password_control_character() {
        let result = ClearTextPassword::new("abc\u{0007}defgh".to_string());
        assert!(matches!(result, Err(PasswordPolicyError::InvalidCharacter)));
    }

    #[test]
    fn test_unicode_password_counts_code_points() {
        // 8 code points, far more than 8 bytes
        let result = ClearTextPassword::new("パスワード安全だ".to_string());
        assert!(result.is_ok());
    }

    #[test]
    fn test_for_verification_skips_policy() {
        let password = ClearTextPassword::for_verification("x".to_string());
        assert_eq!(password.char_count(), 1);
    }

    #[test]
    fn test_nfkc_normalization() {
        // Full-width letters normalize to ASCII
        let password = ClearTextPassword::for_verification("ＡＢＣ".to_string());
        assert_eq!(password.as_str(), "ABC");
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let password = pw("TestPassword123!");
        let hashed = hasher.hash(&password).unwrap();

        assert!(hasher.verify(&password, &hashed));
        assert!(!hasher.verify(&pw("WrongPassword123!"), &hashed));
    }

    #[test]
    fn test_same_password_different_hashes() {
        let hasher = hasher();
        let password = pw("TestPassword123!");
        let first = hasher.hash(&password).unwrap();
        let second = hasher.hash(&password).unwrap();

        assert_ne!(first.as_phc_string(), second.as_phc_string());
        assert!(hasher.verify(&password, &first));
        assert!(hasher.verify(&password, &second));
    }

    #[test]
    fn test_hash_is_not_plaintext() {
        let hasher = hasher();
        let hashed = hasher.hash(&pw("TestPassword123!")).unwrap();
        assert!(!hashed.as_phc_string().contains("TestPassword123!"));
        assert!(hashed.as_phc_string().starts_with("$argon2id$"));
    }

    #[test]
    fn test_hash_with_pepper() {
        let peppered =
            CredentialHasher::new(HasherConfig::low_cost().with_pepper(Some(b"pepper".to_vec())))
                .unwrap();
        let plain = hasher();
        let password = pw("TestPassword123!");
        let hashed = peppered.hash(&password).unwrap();

        assert!(peppered.verify(&password, &hashed));
        assert!(!plain.verify(&password, &hashed));
    }

    #[test]
    fn test_verify_uses_params_from_hash() {
        let password = pw("TestPassword123!");
        let hashed = hasher().hash(&password).unwrap();

        let other = CredentialHasher::new(HasherConfig {
            memory_kib: 2_048,
            ..HasherConfig::low_cost()
        })
        .unwrap();
        assert!(other.verify(&password, &hashed));
    }

    #[test]
    fn test_dummy_never_verifies() {
        let hasher = hasher();
        assert!(!hasher.verify_dummy(&pw("")));
        assert!(!hasher.verify_dummy(&pw("TestPassword123!")));
    }

    #[test]
    fn test_malformed_hash_is_false() {
        let hasher = hasher();
        let malformed = HashedPassword {
            hash: "not_a_valid_hash".to_string(),
        };
        assert!(!hasher.verify(&pw("TestPassword123!"), &malformed));
    }

    #[test]
    fn test_from_stored_keeps_unreadable_value() {
        let hasher = hasher();
        let stored = HashedPassword::from_stored("$argon2id$truncated");
        assert!(!stored.is_well_formed());
        assert!(!hasher.verify(&pw("TestPassword123!"), &stored));

        let hashed = hasher.hash(&pw("TestPassword123!")).unwrap();
        let stored = HashedPassword::from_stored(hashed.as_phc_string());
        assert!(stored.is_well_formed());
        assert!(hasher.verify(&pw("TestPassword123!"), &stored));
    }

    #[test]
    fn test_invalid_params() {
        let result = CredentialHasher::new(HasherConfig {
            memory_kib: 1,
            ..HasherConfig::low_cost()
        });
        assert!(matches!(result, Err(PasswordHashError::InvalidParams(_))));
    }

    #[test]
    fn test_debug_redaction() {
        let password = pw("secret-value");
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret-value"));

        let hashed = hasher().hash(&password).unwrap();
        let debug_output = format!("{:?}", hashed);
        assert!(!debug_output.contains("argon2"));
    }

    // Property-based tests
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_hash_then_verify(password in "[ -~]{0,64}") {
            let password = pw(&password);
            let hashed = SHARED.hash(&password).unwrap();
            prop_assert!(SHARED.verify(&password, &hashed));
        }

        #[test]
        fn prop_other_password_fails(a in "[ -~]{0,64}", b in "[ -~]{0,64}") {
            prop_assume!(a != b);
            let hashed = SHARED.hash(&pw(&a)).unwrap();
            prop_assert!(!SHARED.verify(&pw(&b), &hashed));
        }

        #[test]
        fn prop_salts_differ(password in "[ -~]{0,64}") {
            let password = pw(&password);
            let first = SHARED.hash(&password).unwrap();
            let second = SHARED.hash(&password).unwrap();
            prop_assert_ne!(first.as_phc_string(), second.as_phc_string());
        }

        #[test]
        fn prop_dummy_never_verifies(password in "[ -~]{0,64}") {
            prop_assert!(!SHARED.verify_dummy(&pw(&password)));
        }
    }
}
