//! Service set CLI commands

use anyhow::Result;
use colored::Colorize;
use hive_lib::{
    validation::validate_admin_password, HttpLifecycleClient, LifecycleApi, ServiceAction,
    ServiceKind, ServiceRecord,
};
use tabled::Tabled;

use crate::output::{color_status, print_error, print_json, print_success, OutputFormat};

/// Row for services table
#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Type")]
    service_type: String,
    #[tabled(rename = "Description")]
    description: String,
}

/// List the services, including ones the backend does not report yet
pub async fn list(client: &HttpLifecycleClient, format: OutputFormat) -> Result<()> {
    let services = with_missing(client.list_services().await?);

    match format {
        OutputFormat::Json => print_json(&services),
        OutputFormat::Table => {
            let rows: Vec<ServiceRow> = services
                .iter()
                .map(|s| ServiceRow {
                    name: s.name.clone(),
                    id: truncate_id(&s.id),
                    status: color_status(&s.status),
                    service_type: s.service_type.clone(),
                    description: s.description.clone(),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}

/// Apply `action` to every service
pub async fn bulk(
    client: &HttpLifecycleClient,
    action: ServiceAction,
    admin_password: &str,
    format: OutputFormat,
) -> Result<()> {
    let policy = validate_admin_password(admin_password);
    if !policy.is_valid {
        anyhow::bail!("Admin password rejected: {}", policy.message);
    }

    let result = client.service_action(action, admin_password).await?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Table => {
            let services = ServiceKind::ALL
                .iter()
                .map(|k| k.name())
                .collect::<Vec<_>>()
                .join(", ");
            if result.success {
                print_success(&format!("Services {}: {}", action, services.cyan()));
            } else {
                print_error(&format!("Services {} failed", action));
            }
            if !result.message.is_empty() {
                println!("Message: {}", result.message);
            }
        }
    }

    if !result.success {
        anyhow::bail!("Service {} failed: {}", action, result.message);
    }

    Ok(())
}

/// Append a "not found" entry for each known service the backend omitted
fn with_missing(mut services: Vec<ServiceRecord>) -> Vec<ServiceRecord> {
    for kind in ServiceKind::ALL {
        if !services.iter().any(|s| s.name == kind.name()) {
            services.push(ServiceRecord {
                name: kind.name().to_string(),
                id: String::new(),
                status: "not found".to_string(),
                service_type: String::new(),
                description: kind.description().to_string(),
            });
        }
    }
    services
}

/// Truncate container ID for display
fn truncate_id(id: &str) -> String {
    id.chars().take(12).collect()
}
