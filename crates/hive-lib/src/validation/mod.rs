//! Validation rules for honeypot builder submissions
//!
//! Every validator is a pure function returning a structured result; none of
//! them panic or return errors. Rendering the results (marking fields,
//! showing messages) is left to the caller.
//!
//! - [`resources`]: CPU period/quota and memory/swap limits
//! - [`credentials`]: credential pair lengths, count and duplicates
//! - [`banner`]: banner text blocklist, shape and sanitization
//! - [`name`]: honeypot names used in backend URLs
//! - [`password`]: admin password policy for bulk service actions

pub mod banner;
pub mod credentials;
pub mod name;
pub mod password;
pub mod resources;

pub use banner::{sanitize_banner, validate_banner};
pub use credentials::{
    can_add_credential, validate_all_credentials, validate_credential_count,
    validate_credential_length, validate_no_duplicates, CredentialField, CredentialReport,
    DuplicatePair, LengthError,
};
pub use name::validate_honeypot_name;
pub use password::validate_admin_password;
pub use resources::{
    next_memory_option, validate_cpu_period, validate_cpu_period_input, validate_cpu_quota,
    validate_cpu_quota_input, validate_memory_swap, validate_resources,
};

use crate::catalog::HoneypotCatalog;
use crate::models::CreateHoneypotRequest;
use serde::{Deserialize, Serialize};

/// Result of a single validation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: String::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
        }
    }
}

/// Several rule results folded together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub messages: Vec<String>,
}

impl ValidationReport {
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = ValidationResult>,
    {
        let messages: Vec<String> = results
            .into_iter()
            .filter(|r| !r.is_valid)
            .map(|r| r.message)
            .collect();

        Self {
            is_valid: messages.is_empty(),
            messages,
        }
    }
}

/// Validation of a complete builder submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReport {
    pub is_valid: bool,
    pub messages: Vec<String>,
    pub port: ValidationResult,
    pub resources: ValidationReport,
    pub credentials: CredentialReport,
    pub banner: ValidationResult,
}

/// Validate type/port, resources, credentials and banner of a create request
pub fn validate_submission(
    request: &CreateHoneypotRequest,
    catalog: &HoneypotCatalog,
) -> SubmissionReport {
    let port = catalog.validate_port(request.honeypot_type, request.port);
    let resources = validate_resources(&request.resources);
    let credentials = validate_all_credentials(&request.authentication);
    let banner = validate_banner(&request.banner);

    let mut messages = Vec::new();
    if !port.is_valid {
        messages.push(port.message.clone());
    }
    messages.extend(resources.messages.iter().cloned());
    messages.extend(credentials.messages.iter().cloned());
    if !banner.is_valid {
        messages.push(banner.message.clone());
    }

    SubmissionReport {
        is_valid: messages.is_empty(),
        messages,
        port,
        resources,
        credentials,
        banner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CredentialPair, HoneypotType, ResourceConfig};

    fn valid_request() -> CreateHoneypotRequest {
        CreateHoneypotRequest {
            honeypot_type: HoneypotType::Ssh,
            port: 2222,
            resources: ResourceConfig::default(),
            banner: "SSH-2.0-OpenSSH_8.9p1 Ubuntu".to_string(),
            authentication: vec![
                CredentialPair::new("admin", "admin123"),
                CredentialPair::new("root", "toor1234"),
                CredentialPair::new("guest", "guest"),
            ],
        }
    }

    #[test]
    fn test_valid_submission() {
        let report = validate_submission(&valid_request(), &HoneypotCatalog::builtin());
        assert!(report.is_valid, "unexpected messages: {:?}", report.messages);
        assert!(report.messages.is_empty());
    }

    #[test]
    fn test_submission_collects_every_failure() {
        let mut request = valid_request();
        request.port = 80;
        request.resources.cpu_quota = 150_000;
        request.authentication.truncate(2);
        request.banner = "bad `uname`".to_string();

        let report = validate_submission(&request, &HoneypotCatalog::builtin());
        assert!(!report.is_valid);
        assert!(!report.port.is_valid);
        assert!(!report.resources.is_valid);
        assert!(!report.credentials.is_valid);
        assert!(!report.banner.is_valid);
        assert!(report.messages.len() >= 4);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let json = serde_json::to_value(ValidationResult::invalid("nope")).unwrap();
        assert_eq!(json["isValid"], false);
        assert_eq!(json["message"], "nope");
    }
}
