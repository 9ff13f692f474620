//! Credential set validation
//!
//! A honeypot accepts between [`MIN_CREDENTIALS`] and [`MAX_CREDENTIALS`]
//! distinct username/password pairs. Lengths are counted in characters, not
//! bytes.

use super::ValidationResult;
use crate::models::CredentialPair;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const CREDENTIAL_MIN_LENGTH: usize = 4;
pub const CREDENTIAL_MAX_LENGTH: usize = 10;
pub const MIN_CREDENTIALS: usize = 3;
pub const MAX_CREDENTIALS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialField {
    Username,
    Password,
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialField::Username => f.write_str("Username"),
            CredentialField::Password => f.write_str("Password"),
        }
    }
}

/// A username or password outside the length bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LengthError {
    /// Zero-based position in the credential list
    pub index: usize,
    pub field: CredentialField,
    pub length: usize,
    pub message: String,
}

/// Two positions holding the same pair; `first < second`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicatePair {
    pub first: usize,
    pub second: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialReport {
    pub is_valid: bool,
    pub messages: Vec<String>,
    pub count: usize,
    pub count_valid: bool,
    pub length_errors: Vec<LengthError>,
    pub has_duplicates: bool,
    pub duplicates: Vec<DuplicatePair>,
}

fn check_field(index: usize, field: CredentialField, value: &str) -> Option<LengthError> {
    let length = value.chars().count();
    let message = if length == 0 {
        format!("{} {} is required", field, index + 1)
    } else if !(CREDENTIAL_MIN_LENGTH..=CREDENTIAL_MAX_LENGTH).contains(&length) {
        format!(
            "{} {} must be between {} and {} characters (got {})",
            field,
            index + 1,
            CREDENTIAL_MIN_LENGTH,
            CREDENTIAL_MAX_LENGTH,
            length
        )
    } else {
        return None;
    };

    Some(LengthError {
        index,
        field,
        length,
        message,
    })
}

/// Every username and password must be non-empty and within the length bounds
pub fn validate_credential_length(credentials: &[CredentialPair]) -> Vec<LengthError> {
    credentials
        .iter()
        .enumerate()
        .flat_map(|(index, pair)| {
            [
                check_field(index, CredentialField::Username, &pair.username),
                check_field(index, CredentialField::Password, &pair.password),
            ]
        })
        .flatten()
        .collect()
}

/// Find repeated pairs; each repeat is reported against its first occurrence
pub fn validate_no_duplicates(credentials: &[CredentialPair]) -> Vec<DuplicatePair> {
    let mut seen: HashMap<(&str, &str), usize> = HashMap::new();
    let mut duplicates = Vec::new();

    for (index, pair) in credentials.iter().enumerate() {
        let key = (pair.username.as_str(), pair.password.as_str());
        match seen.get(&key) {
            Some(&first) => duplicates.push(DuplicatePair {
                first,
                second: index,
            }),
            None => {
                seen.insert(key, index);
            }
        }
    }

    duplicates
}

pub fn validate_credential_count(count: usize) -> ValidationResult {
    if count < MIN_CREDENTIALS {
        return ValidationResult::invalid(format!(
            "At least {} credential pairs are required (got {})",
            MIN_CREDENTIALS, count
        ));
    }
    if count > MAX_CREDENTIALS {
        return ValidationResult::invalid(format!(
            "At most {} credential pairs are allowed (got {})",
            MAX_CREDENTIALS, count
        ));
    }
    ValidationResult::valid()
}

fn duplicate_message(duplicate: &DuplicatePair) -> String {
    format!(
        "Credential pair {} duplicates pair {}",
        duplicate.second + 1,
        duplicate.first + 1
    )
}

/// Run every credential rule and fold the outcome into one report
pub fn validate_all_credentials(credentials: &[CredentialPair]) -> CredentialReport {
    let length_errors = validate_credential_length(credentials);
    let duplicates = validate_no_duplicates(credentials);
    let count = validate_credential_count(credentials.len());

    let mut messages: Vec<String> = length_errors.iter().map(|e| e.message.clone()).collect();
    messages.extend(duplicates.iter().map(duplicate_message));
    if !count.is_valid {
        messages.push(count.message);
    }

    CredentialReport {
        is_valid: messages.is_empty(),
        messages,
        count: credentials.len(),
        count_valid: count.is_valid,
        length_errors,
        has_duplicates: !duplicates.is_empty(),
        duplicates,
    }
}

/// Whether `candidate` may be appended to `existing`
pub fn can_add_credential(
    existing: &[CredentialPair],
    candidate: &CredentialPair,
) -> ValidationResult {
    if existing.len() >= MAX_CREDENTIALS {
        return ValidationResult::invalid(format!(
            "At most {} credential pairs are allowed",
            MAX_CREDENTIALS
        ));
    }

    let index = existing.len();
    for (field, value) in [
        (CredentialField::Username, &candidate.username),
        (CredentialField::Password, &candidate.password),
    ] {
        if let Some(error) = check_field(index, field, value) {
            return ValidationResult::invalid(error.message);
        }
    }

    if let Some(first) = existing.iter().position(|pair| pair == candidate) {
        return ValidationResult::invalid(format!(
            "Credential pair duplicates pair {}",
            first + 1
        ));
    }

    ValidationResult::valid()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<CredentialPair> {
        raw.iter().map(|(u, p)| CredentialPair::new(*u, *p)).collect()
    }

    #[test]
    fn test_length_bounds() {
        let creds = pairs(&[("abcd", "abcdefghij"), ("abc", "password"), ("user", "")]);
        let errors = validate_credential_length(&creds);

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].index, 1);
        assert_eq!(errors[0].field, CredentialField::Username);
        assert_eq!(errors[0].length, 3);
        assert_eq!(errors[1].index, 2);
        assert_eq!(errors[1].field, CredentialField::Password);
        assert_eq!(errors[1].message, "Password 3 is required");
    }

    #[test]
    fn test_length_counts_characters() {
        // Four characters, eight bytes
        let creds = pairs(&[("ünïç", "pässwörd")]);
        assert!(validate_credential_length(&creds).is_empty());
    }

    #[test]
    fn test_duplicates_report_both_indices() {
        let creds = pairs(&[
            ("admin", "admin"),
            ("root", "toor"),
            ("admin", "admin"),
            ("root", "toor"),
        ]);
        let duplicates = validate_no_duplicates(&creds);
        assert_eq!(
            duplicates,
            vec![
                DuplicatePair { first: 0, second: 2 },
                DuplicatePair { first: 1, second: 3 },
            ]
        );
    }

    #[test]
    fn test_duplicates_compare_pairs_not_concatenation() {
        let creds = pairs(&[("adminx", "pass"), ("admin", "xpass")]);
        assert!(validate_no_duplicates(&creds).is_empty());
    }

    #[test]
    fn test_count_bounds() {
        for count in 0..=12 {
            let result = validate_credential_count(count);
            let expected = (MIN_CREDENTIALS..=MAX_CREDENTIALS).contains(&count);
            assert_eq!(result.is_valid, expected, "count={}", count);
            if !expected {
                assert!(result.message.contains(&format!("(got {})", count)));
            }
        }
    }

    #[test]
    fn test_validate_all() {
        let creds = pairs(&[("admin", "admin1"), ("root", "toor1"), ("guest", "guest")]);
        let report = validate_all_credentials(&creds);
        assert!(report.is_valid);
        assert_eq!(report.count, 3);

        let creds = pairs(&[("admin", "admin1"), ("admin", "admin1")]);
        let report = validate_all_credentials(&creds);
        assert!(!report.is_valid);
        assert!(report.has_duplicates);
        assert!(!report.count_valid);
        assert_eq!(report.messages.len(), 2);
        assert_eq!(report.messages[0], "Credential pair 2 duplicates pair 1");
    }

    #[test]
    fn test_can_add_credential() {
        let creds = pairs(&[("admin", "admin1"), ("root", "toor1")]);
        assert!(can_add_credential(&creds, &CredentialPair::new("guest", "guest")).is_valid);
        assert!(!can_add_credential(&creds, &CredentialPair::new("admin", "admin1")).is_valid);
        assert!(!can_add_credential(&creds, &CredentialPair::new("ab", "guest")).is_valid);

        let full: Vec<CredentialPair> = (0..MAX_CREDENTIALS)
            .map(|i| CredentialPair::new(format!("user{}", i), "secret"))
            .collect();
        let result = can_add_credential(&full, &CredentialPair::new("extra", "secret"));
        assert!(!result.is_valid);
    }
}
