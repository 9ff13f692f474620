//! Admin password policy for bulk service actions

use super::ValidationResult;

pub const ADMIN_PASSWORD_MIN_LENGTH: usize = 10;

/// Characters refused because the backend passes the password through a shell
const FORBIDDEN_CHARS: [char; 3] = ['$', '`', '~'];

pub fn validate_admin_password(password: &str) -> ValidationResult {
    if password.is_empty() {
        return ValidationResult::invalid("Admin password is required");
    }

    if password.chars().count() < ADMIN_PASSWORD_MIN_LENGTH {
        return ValidationResult::invalid(format!(
            "Admin password must be at least {} characters",
            ADMIN_PASSWORD_MIN_LENGTH
        ));
    }

    if let Some(c) = password.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return ValidationResult::invalid(format!("Admin password cannot contain '{}'", c));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return ValidationResult::invalid("Admin password must contain at least one digit");
    }

    if !password.chars().any(|c| c.is_ascii_punctuation()) {
        return ValidationResult::invalid(
            "Admin password must contain at least one special character",
        );
    }

    ValidationResult::valid()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_compliant_password() {
        assert!(validate_admin_password("Sup3r-Secret").is_valid);
        assert!(validate_admin_password("abcdefgh1!").is_valid);
    }

    #[test]
    fn test_policy_failures() {
        assert_eq!(validate_admin_password("").message, "Admin password is required");
        assert!(validate_admin_password("short1!").message.contains("at least 10"));
        assert!(validate_admin_password("NoDigitsHere!").message.contains("digit"));
        assert!(validate_admin_password("NoSpecial123").message.contains("special"));
    }

    #[test]
    fn test_forbidden_characters() {
        for pw in ["Password1$x", "Password1`x", "Password1~x"] {
            let result = validate_admin_password(pw);
            assert!(!result.is_valid, "{} should be rejected", pw);
            assert!(result.message.contains("cannot contain"));
        }
    }
}
