//! Offline validation commands

use anyhow::Result;
use hive_lib::{
    validation::{
        sanitize_banner, validate_all_credentials, validate_banner, validate_cpu_period_input,
        validate_cpu_quota_input, validate_memory_swap,
    },
    CredentialPair, ValidationReport,
};

use crate::output::{print_check, print_error, print_json, print_success, OutputFormat};

/// Validate raw CPU and memory input as typed into the builder
pub fn resources(
    cpu_period: &str,
    cpu_quota: &str,
    memory: &str,
    swap: &str,
    format: OutputFormat,
) -> Result<()> {
    let checks = [
        ("CPU period", validate_cpu_period_input(cpu_period)),
        ("CPU quota", validate_cpu_quota_input(cpu_quota, cpu_period)),
        ("Memory/swap", validate_memory_swap(swap, memory)),
    ];

    match format {
        OutputFormat::Json => {
            let report = ValidationReport::from_results(checks.iter().map(|(_, r)| r.clone()));
            print_json(&report);
        }
        OutputFormat::Table => {
            for (label, result) in &checks {
                print_check(label, result);
            }
        }
    }

    let failures = checks.iter().filter(|(_, r)| !r.is_valid).count();
    if failures > 0 {
        anyhow::bail!("{} resource checks failed", failures);
    }

    Ok(())
}

pub fn credentials(credentials: &[CredentialPair], format: OutputFormat) -> Result<()> {
    let report = validate_all_credentials(credentials);

    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Table => {
            if report.is_valid {
                print_success(&format!("{} credential pairs are valid", report.count));
            }
            for message in &report.messages {
                print_error(message);
            }
        }
    }

    if !report.is_valid {
        anyhow::bail!("Credentials failed validation");
    }

    Ok(())
}

pub fn banner(text: &str, sanitize: bool, format: OutputFormat) -> Result<()> {
    let result = validate_banner(text);
    let sanitized = sanitize.then(|| sanitize_banner(text));

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "result": result,
            "sanitized": sanitized,
        })),
        OutputFormat::Table => {
            print_check("Banner", &result);
            if let Some(clean) = &sanitized {
                println!("\nSanitized banner:");
                println!("---");
                println!("{}", clean);
            }
        }
    }

    if !result.is_valid {
        anyhow::bail!("Banner failed validation");
    }

    Ok(())
}
