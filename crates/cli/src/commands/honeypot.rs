//! Honeypot lifecycle CLI commands

use anyhow::Result;
use colored::Colorize;
use hive_lib::{
    validate_submission, CreateHoneypotRequest, CredentialPair, HoneypotAction, HoneypotRecord,
    HoneypotType, HttpLifecycleClient, LifecycleApi, OperationResult, ResourceConfig,
};
use tabled::Tabled;

use crate::output::{
    color_honeypot_status, format_cpu_share, format_memory, print_check, print_error,
    print_info, print_success, print_warning, OutputFormat,
};
use crate::ResourceArgs;

/// Row for honeypots table
#[derive(Tabled)]
struct HoneypotRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    honeypot_type: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Swap")]
    swap: String,
}

impl From<&HoneypotRecord> for HoneypotRow {
    fn from(record: &HoneypotRecord) -> Self {
        let cpu = record
            .cpu_share()
            .map(format_cpu_share)
            .unwrap_or_else(|| "-".to_string());

        Self {
            name: record.name.clone(),
            honeypot_type: record.honeypot_type.to_string(),
            port: record.port,
            status: color_honeypot_status(record.status),
            cpu,
            memory: record
                .memory_limit
                .as_deref()
                .map(format_memory)
                .unwrap_or_else(|| "-".to_string()),
            swap: record
                .memory_swap_limit
                .as_deref()
                .map(format_memory)
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

fn past_tense(action: HoneypotAction) -> &'static str {
    match action {
        HoneypotAction::Start => "started",
        HoneypotAction::Stop => "stopped",
        HoneypotAction::Restart => "restarted",
        HoneypotAction::Delete => "deleted",
    }
}

/// Assemble a create request from command-line arguments.
///
/// Swap defaults to the option above the memory limit. Returns whether a
/// swap limit below the memory limit had to be raised.
pub fn build_request(
    honeypot_type: HoneypotType,
    port: u32,
    resources: &ResourceArgs,
    banner: String,
    authentication: Vec<CredentialPair>,
) -> (CreateHoneypotRequest, bool) {
    let swap = resources.swap.unwrap_or_else(|| resources.memory.next());

    let mut config = ResourceConfig {
        cpu_period: resources.cpu_period,
        cpu_quota: resources.cpu_quota,
        memory_limit: resources.memory.to_string(),
        memory_swap_limit: swap.to_string(),
    };
    let swap_raised = config.autocorrect_swap();

    let request = CreateHoneypotRequest {
        honeypot_type,
        port,
        resources: config,
        banner,
        authentication,
    };

    (request, swap_raised)
}

/// Validate a submission and, unless `dry_run`, create the honeypot
pub async fn create(
    client: &HttpLifecycleClient,
    request: CreateHoneypotRequest,
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    let report = validate_submission(&request, client.catalog());

    if let OutputFormat::Table = format {
        print_check("Port", &report.port);
        for message in &report.resources.messages {
            print_error(&format!("Resources: {}", message));
        }
        if report.resources.is_valid {
            print_success("Resources");
        }
        for message in &report.credentials.messages {
            print_error(&format!("Credentials: {}", message));
        }
        if report.credentials.is_valid {
            print_success(&format!("Credentials ({} pairs)", report.credentials.count));
        }
        print_check("Banner", &report.banner);
        println!();
    }

    if !report.is_valid {
        if let OutputFormat::Json = format {
            crate::output::print_json(&report);
        }
        anyhow::bail!(
            "Submission failed validation ({} problems)",
            report.messages.len()
        );
    }

    if dry_run {
        match format {
            OutputFormat::Json => crate::output::print_json(&report),
            OutputFormat::Table => print_warning("Dry-run mode - honeypot not created"),
        }
        return Ok(());
    }

    let record = client.create_honeypot(&request).await?;

    match format {
        OutputFormat::Json => crate::output::print_json(&record),
        OutputFormat::Table => {
            print_success(&format!("Honeypot {} created", record.name.cyan()));
            println!("Status: {}", color_honeypot_status(record.status));
            println!("Port:   {}", record.port);
            if !record.image.is_empty() {
                println!("Image:  {}", record.image);
            }
        }
    }

    Ok(())
}

/// List honeypots
pub async fn list(client: &HttpLifecycleClient, running_only: bool, format: OutputFormat) -> Result<()> {
    let honeypots: Vec<HoneypotRecord> = client
        .list_honeypots()
        .await?
        .into_iter()
        .filter(|h| !running_only || h.status.is_running())
        .collect();

    match format {
        OutputFormat::Json => crate::output::print_json(&honeypots),
        OutputFormat::Table => {
            if honeypots.is_empty() {
                print_warning("No honeypots found");
                return Ok(());
            }

            let rows: Vec<HoneypotRow> = honeypots.iter().map(HoneypotRow::from).collect();
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!("\nTotal: {} honeypots", honeypots.len());
        }
    }

    Ok(())
}

/// Show one honeypot
pub async fn status(client: &HttpLifecycleClient, name: &str, format: OutputFormat) -> Result<()> {
    let record = client.honeypot_status(name).await?;

    match format {
        OutputFormat::Json => crate::output::print_json(&record),
        OutputFormat::Table => {
            println!("{}", "Honeypot".bold());
            println!("{}", "=".repeat(40));
            println!("Name:    {}", record.name.cyan());
            println!("Type:    {}", record.honeypot_type);
            println!("Port:    {}", record.port);
            println!("Status:  {}", color_honeypot_status(record.status));
            if let Some(banner) = &record.banner {
                println!("Banner:  {}", banner.replace('\n', "\n         "));
            }
            if !record.authentication.is_empty() {
                println!("Credentials: {}", record.authentication.len());
            }
        }
    }

    Ok(())
}

/// Start, stop, restart or delete a honeypot
pub async fn lifecycle(
    client: &HttpLifecycleClient,
    name: &str,
    action: HoneypotAction,
    format: OutputFormat,
) -> Result<()> {
    if action == HoneypotAction::Restart {
        print_info(&format!("Restart strategy: {:?}", client.restart_strategy()));
    }

    let result: OperationResult = client.apply_action(name, action).await?;

    match format {
        OutputFormat::Json => crate::output::print_json(&result),
        OutputFormat::Table => {
            if result.success {
                print_success(&format!("Honeypot {} {}", name, past_tense(action)));
            } else {
                print_error(&format!("Honeypot {} was not {}", name, past_tense(action)));
            }
            if let Some(status) = result.status {
                println!("Status:  {}", color_honeypot_status(status));
            }
            if !result.message.is_empty() {
                println!("Message: {}", result.message);
            }
        }
    }

    if !result.success {
        anyhow::bail!("{} failed: {}", past_tense(action), result.message);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_lib::{HoneypotStatus, MemoryLimit};

    fn args(memory: MemoryLimit, swap: Option<MemoryLimit>) -> ResourceArgs {
        ResourceArgs {
            cpu_period: 100_000,
            cpu_quota: 50_000,
            memory,
            swap,
        }
    }

    fn creds() -> Vec<CredentialPair> {
        vec![
            CredentialPair::new("admin", "admin123"),
            CredentialPair::new("root", "toor1234"),
            CredentialPair::new("guest", "guest"),
        ]
    }

    #[test]
    fn test_build_request_defaults_swap_above_memory() {
        let (request, raised) = build_request(
            HoneypotType::Ssh,
            2222,
            &args(MemoryLimit::Mb512, None),
            "SSH-2.0-OpenSSH_8.9p1".to_string(),
            creds(),
        );
        assert!(!raised);
        assert_eq!(request.resources.memory_swap_limit, "768m");
        assert!(validate_submission(&request, &hive_lib::HoneypotCatalog::builtin()).is_valid);
    }

    #[test]
    fn test_build_request_raises_low_swap() {
        let (request, raised) = build_request(
            HoneypotType::Ftp,
            2121,
            &args(MemoryLimit::Mb1024, Some(MemoryLimit::Mb256)),
            "220 FTP server ready".to_string(),
            creds(),
        );
        assert!(raised);
        assert_eq!(request.resources.memory_swap_limit, "1536m");
    }

    #[test]
    fn test_row_from_record() {
        let record = HoneypotRecord {
            name: "hive-http-8080".to_string(),
            honeypot_type: HoneypotType::Http,
            port: 8080,
            status: HoneypotStatus::Exited,
            image: String::new(),
            cpu_period: Some(100_000),
            cpu_quota: Some(25_000),
            memory_limit: Some("256m".to_string()),
            memory_swap_limit: None,
            banner: None,
            authentication: Vec::new(),
        };

        let row = HoneypotRow::from(&record);
        assert_eq!(row.cpu, "25%");
        assert_eq!(row.memory, "256Mi");
        assert_eq!(row.swap, "-");
    }
}
