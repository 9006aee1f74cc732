//! Password Strength Estimation
//!
//! Scores a candidate password with zxcvbn (pattern matching against
//! dictionaries, keyboard walks, sequences, dates and repeats) rather than
//! raw length or character-class rules.
//!
//! Levels follow zxcvbn:
//! - 0: too guessable (< 10^3 guesses)
//! - 1: very guessable (< 10^6)
//! - 2: somewhat guessable (< 10^8)
//! - 3: safely unguessable (< 10^10)
//! - 4: very unguessable (>= 10^10)

use serde::Serialize;

use crate::password::ClearTextPassword;

/// Lowest level accepted when a password is set
pub const MIN_ACCEPTED_LEVEL: u8 = 3;

/// Result of scoring a password
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrengthReport {
    /// 0..=4
    pub level: u8,
    /// Main reason the password is weak, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// How to pick a stronger password
    pub suggestions: Vec<String>,
}

impl StrengthReport {
    pub fn is_acceptable(&self) -> bool {
        self.level >= MIN_ACCEPTED_LEVEL
    }
}

/// Score a password
///
/// `user_inputs` are account-specific strings (email, user name) that the
/// estimator treats as a dictionary, so passwords built from them score low.
///
/// ## Examples
/// ```rust
/// use platform::password::ClearTextPassword;
/// use platform::strength::score;
///
/// let weak = ClearTextPassword::new("password123456".to_string()).unwrap();
/// assert!(!score(&weak, &[]).is_acceptable());
/// ```
pub fn score(password: &ClearTextPassword, user_inputs: &[&str]) -> StrengthReport {
    let entropy = zxcvbn::zxcvbn(password.as_str(), user_inputs);
    let level = entropy.score() as u8;

    let (warning, mut suggestions) = match entropy.feedback() {
        Some(feedback) => (
            feedback.warning().map(|w| w.to_string()),
            feedback
                .suggestions()
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>(),
        ),
        None => (None, Vec::new()),
    };

    // zxcvbn gives no feedback for level 3+, but a rejected password must
    // always tell the caller something actionable
    if level < MIN_ACCEPTED_LEVEL && suggestions.is_empty() {
        suggestions.push("Add another word or two. Uncommon words are better.".to_string());
    }

    tracing::debug!(level, "Scored password strength");

    StrengthReport {
        level,
        warning,
        suggestions,
    }
}
