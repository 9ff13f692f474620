//! Honeypot name validation
//!
//! Names become a path segment of backend URLs, so only container-name
//! characters are accepted: an ASCII letter or digit first, then letters,
//! digits, `_`, `.` or `-`.

use super::ValidationResult;

pub const MAX_NAME_LENGTH: usize = 64;

pub fn validate_honeypot_name(name: &str) -> ValidationResult {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return ValidationResult::invalid("Honeypot name is required");
    };

    if name.len() > MAX_NAME_LENGTH {
        return ValidationResult::invalid(format!(
            "Honeypot name cannot exceed {} characters",
            MAX_NAME_LENGTH
        ));
    }

    if !first.is_ascii_alphanumeric() {
        return ValidationResult::invalid(format!(
            "Honeypot name must start with a letter or digit: {:?}",
            name
        ));
    }

    if let Some(c) = chars.find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))) {
        return ValidationResult::invalid(format!(
            "Honeypot name contains invalid character {:?}",
            c
        ));
    }

    ValidationResult::valid()
}
