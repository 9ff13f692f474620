//! Port availability CLI commands

use anyhow::Result;
use hive_lib::{HttpLifecycleClient, LifecycleApi, PortAvailability};

use crate::output::{print_error, print_json, print_success, OutputFormat};

/// Check a host port locally, then ask the API whether it is free
pub async fn check(client: &HttpLifecycleClient, port: u32, format: OutputFormat) -> Result<()> {
    let local = client.catalog().validate_host_port(port);

    let availability = if local.is_valid {
        // Range was checked above, so the port fits in u16
        client.check_port_availability(port as u16).await?
    } else {
        PortAvailability {
            port: u16::try_from(port).unwrap_or(u16::MAX),
            available: false,
            message: local.message,
        }
    };

    match format {
        OutputFormat::Json => print_json(&availability),
        OutputFormat::Table => {
            if availability.available {
                print_success(&format!("Port {} is available", port));
            } else if availability.message.is_empty() {
                print_error(&format!("Port {} is in use", port));
            } else {
                print_error(&format!("Port {} is not available: {}", port, availability.message));
            }
        }
    }

    if !availability.available {
        anyhow::bail!("Port {} cannot be used", port);
    }

    Ok(())
}
