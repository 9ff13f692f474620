//! Honeypot type catalog commands

use anyhow::Result;
use hive_lib::{HoneypotCatalog, HttpLifecycleClient};
use tabled::Tabled;

use crate::output::{print_table, OutputFormat};

/// Row for the catalog table
#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Type")]
    honeypot_type: String,
    #[tabled(rename = "Image")]
    image: String,
    #[tabled(rename = "Port")]
    container_port: String,
    #[tabled(rename = "Passive ports")]
    passive_ports: String,
    #[tabled(rename = "Volumes")]
    volumes: usize,
}

fn rows(catalog: &HoneypotCatalog) -> Vec<TypeRow> {
    catalog
        .iter()
        .map(|(honeypot_type, spec)| TypeRow {
            honeypot_type: honeypot_type.to_string(),
            image: spec.image.clone(),
            container_port: format!("{}/{}", spec.container_port, spec.protocol),
            passive_ports: spec
                .passive_ports
                .map(|r| format!("{}-{}", r.start, r.end))
                .unwrap_or_else(|| "-".to_string()),
            volumes: spec.volumes.len(),
        })
        .collect()
}

pub fn show(catalog: &HoneypotCatalog, format: OutputFormat) -> Result<()> {
    print_table(rows(catalog), catalog, format);
    Ok(())
}

/// Show the catalog the gateway validates against
pub async fn show_remote(client: &HttpLifecycleClient, format: OutputFormat) -> Result<()> {
    let catalog: HoneypotCatalog = client.get("api/v1/types").await?;
    show(&catalog, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_from_builtin_catalog() {
        let rows = rows(&HoneypotCatalog::builtin());
        assert_eq!(rows.len(), 3);

        let ftp = rows.iter().find(|r| r.honeypot_type == "ftp").unwrap();
        assert_eq!(ftp.container_port, "21/tcp");
        assert_eq!(ftp.passive_ports, "30000-30009");
    }
}
