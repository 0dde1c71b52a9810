//! Signup form hints
//!
//! Client-side classification of signup fields. These only drive visual
//! feedback; the server stays authoritative and submission is never blocked.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Longest username the account model accepts
pub const USERNAME_MAX_LEN: usize = 150;

/// Password strength bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    /// Classify a password.
    ///
    /// Strong needs 12+ characters with an ASCII uppercase letter, an ASCII
    /// digit and a character that is neither; otherwise 8+ characters is
    /// medium and anything shorter is weak.
    pub fn classify(password: &str) -> Self {
        let len = password.chars().count();
        let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        let has_symbol = password.chars().any(|c| !c.is_ascii_alphanumeric());

        if len >= 12 && has_upper && has_digit && has_symbol {
            PasswordStrength::Strong
        } else if len >= 8 {
            PasswordStrength::Medium
        } else {
            PasswordStrength::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PasswordStrength::Weak => "weak",
            PasswordStrength::Medium => "medium",
            PasswordStrength::Strong => "strong",
        }
    }

    /// Class list for the strength indicator bar
    pub fn indicator_class(&self) -> String {
        format!("password-strength strength-{}", self.as_str())
    }
}

impl fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual validity of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Valid,
    Invalid,
}

impl FieldState {
    fn from_valid(valid: bool) -> Self {
        if valid {
            FieldState::Valid
        } else {
            FieldState::Invalid
        }
    }

    pub fn is_valid(&self) -> bool {
        *self == FieldState::Valid
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(r"^[A-Za-z0-9@.+_-]{{0,{}}}$", USERNAME_MAX_LEN))
            .expect("valid username regex")
    })
}

/// Empty is valid; otherwise `local@domain.tld` without whitespace
pub fn check_email(value: &str) -> FieldState {
    FieldState::from_valid(value.is_empty() || email_pattern().is_match(value))
}

/// Empty is valid; otherwise up to 150 of `A-Z a-z 0-9 @ . + _ -`
pub fn check_username(value: &str) -> FieldState {
    FieldState::from_valid(value.is_empty() || username_pattern().is_match(value))
}

/// Invalid only when both passwords are filled in and differ
pub fn check_confirmation(password: &str, confirmation: &str) -> FieldState {
    let mismatch = !password.is_empty() && !confirmation.is_empty() && password != confirmation;
    FieldState::from_valid(!mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_strength_levels() {
        assert_eq!(PasswordStrength::classify("abc"), PasswordStrength::Weak);
        assert_eq!(PasswordStrength::classify(""), PasswordStrength::Weak);
        assert_eq!(PasswordStrength::classify("abcdefgh"), PasswordStrength::Medium);
        assert_eq!(PasswordStrength::classify("Abcdefghijk1!"), PasswordStrength::Strong);
    }

    #[test]
    fn test_long_password_missing_a_class_is_medium() {
        assert_eq!(PasswordStrength::classify("abcdefghijk1!"), PasswordStrength::Medium);
        assert_eq!(PasswordStrength::classify("Abcdefghijkl!"), PasswordStrength::Medium);
        assert_eq!(PasswordStrength::classify("Abcdefghijk12"), PasswordStrength::Medium);
        // 11 characters with every class is still short of strong
        assert_eq!(PasswordStrength::classify("Abcdefghi1!"), PasswordStrength::Medium);
    }

    #[test]
    fn test_indicator_class() {
        assert_eq!(
            PasswordStrength::Strong.indicator_class(),
            "password-strength strength-strong"
        );
    }

    #[test]
    fn test_email_hints() {
        assert!(check_email("a@b.com").is_valid());
        assert!(check_email("").is_valid());
        assert!(!check_email("a@b").is_valid());
        assert!(!check_email("a b@c.com").is_valid());
        assert!(!check_email("a@@b.com").is_valid());
        assert!(check_email("first.last@mail.example.org").is_valid());
    }

    #[test]
    fn test_username_hints() {
        assert!(check_username("").is_valid());
        assert!(check_username("jane.doe+jobs@home_1-2").is_valid());
        assert!(check_username(&"a".repeat(150)).is_valid());
        assert!(!check_username(&"a".repeat(151)).is_valid());
        assert!(!check_username("jane doe").is_valid());
        assert!(!check_username("jané").is_valid());
    }

    #[test]
    fn test_confirmation_hints() {
        assert!(check_confirmation("secret", "secret").is_valid());
        assert!(!check_confirmation("secret", "secreT").is_valid());
        assert!(check_confirmation("", "anything").is_valid());
        assert!(check_confirmation("secret", "").is_valid());
    }
}
