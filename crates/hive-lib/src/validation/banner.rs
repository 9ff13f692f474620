//! Banner text validation and sanitization
//!
//! Banners end up in generated service configuration that untrusted clients
//! can read, so shell metacharacters and control characters are refused
//! outright. Newlines separate lines; tabs are allowed inside a line.

use super::ValidationResult;

pub const MAX_LINES: usize = 4;
pub const MAX_LINE_LENGTH: usize = 100;
pub const MIN_CONTENT_CHARS: usize = 10;

const BLOCKED_CHARS: [char; 7] = ['\\', '`', '"', '\'', ';', '&', '$'];

fn is_blocked_control(c: char) -> bool {
    c.is_ascii_control() && c != '\n' && c != '\t'
}

pub fn validate_banner(banner: &str) -> ValidationResult {
    if banner.trim().is_empty() {
        return ValidationResult::invalid("Banner cannot be empty");
    }

    if let Some(c) = banner.chars().find(|c| BLOCKED_CHARS.contains(c)) {
        return ValidationResult::invalid(format!("Banner contains forbidden character '{}'", c));
    }

    if banner.chars().any(is_blocked_control) {
        return ValidationResult::invalid("Banner contains control characters");
    }

    let lines: Vec<&str> = banner.split('\n').collect();
    if lines.len() > MAX_LINES {
        return ValidationResult::invalid(format!(
            "Banner cannot exceed {} lines (got {})",
            MAX_LINES,
            lines.len()
        ));
    }

    for (idx, line) in lines.iter().enumerate() {
        let length = line.chars().count();
        if length > MAX_LINE_LENGTH {
            return ValidationResult::invalid(format!(
                "Line {} exceeds {} characters (got {})",
                idx + 1,
                MAX_LINE_LENGTH,
                length
            ));
        }
    }

    let content = banner.chars().filter(|c| !c.is_whitespace()).count();
    if content < MIN_CONTENT_CHARS {
        return ValidationResult::invalid(format!(
            "Banner must contain at least {} non-whitespace characters",
            MIN_CONTENT_CHARS
        ));
    }

    ValidationResult::valid()
}

/// Strip forbidden characters and clamp the banner to the allowed shape.
///
/// `&` becomes `+`; the other blocked characters and control characters are
/// dropped. At most [`MAX_LINES`] lines are kept, each cut to
/// [`MAX_LINE_LENGTH`] characters. The result can still fail
/// [`validate_banner`] (for example when too little text remains).
pub fn sanitize_banner(banner: &str) -> String {
    let cleaned: String = banner
        .chars()
        .filter_map(|c| match c {
            '&' => Some('+'),
            c if BLOCKED_CHARS.contains(&c) || is_blocked_control(c) => None,
            c => Some(c),
        })
        .collect();

    cleaned
        .split('\n')
        .take(MAX_LINES)
        .map(|line| line.chars().take(MAX_LINE_LENGTH).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
