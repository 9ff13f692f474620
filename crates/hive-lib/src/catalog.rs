//! Honeypot type catalog
//!
//! Maps each honeypot type to its image, container port, volumes and optional
//! passive port range. The catalog is YAML; a default ships with the crate
//! and deployments may point the gateway at their own file.

use crate::models::HoneypotType;
use crate::validation::ValidationResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Lowest host port a honeypot may bind
pub const MIN_HOST_PORT: u32 = 1024;
pub const MAX_HOST_PORT: u32 = 65535;

const BUILTIN_CATALOG: &str = include_str!("../honeypot_types.yaml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("unknown honeypot type in catalog: {0}")]
    UnknownType(String),

    #[error("invalid passive port range {start}-{end} for {honeypot_type}")]
    InvalidPassiveRange {
        honeypot_type: HoneypotType,
        start: u16,
        end: u16,
    },

    #[error("honeypot type {0} is not defined in the catalog")]
    Undefined(HoneypotType),
}

/// Inclusive port range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub fn contains(&self, port: u32) -> bool {
        port >= self.start as u32 && port <= self.end as u32
    }

    pub fn ports(&self) -> impl Iterator<Item = u16> {
        self.start..=self.end
    }
}

fn default_protocol() -> String {
    "tcp".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoneypotTypeSpec {
    pub image: String,
    pub container_port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default)]
    pub volumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passive_ports: Option<PortRange>,
}

/// Host-to-container port mapping the backend publishes for a honeypot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    pub host_port: u16,
    pub container_port: u16,
    pub protocol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoneypotCatalog {
    types: BTreeMap<HoneypotType, HoneypotTypeSpec>,
}

impl HoneypotCatalog {
    /// Catalog compiled into the crate
    pub fn builtin() -> Self {
        // Embedded at compile time; see test_builtin_catalog
        Self::load_from_str(BUILTIN_CATALOG).expect("built-in honeypot catalog is valid")
    }

    pub fn load_from_str(yaml: &str) -> Result<Self, CatalogError> {
        let raw: BTreeMap<String, HoneypotTypeSpec> = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()?
            .try_deserialize()?;

        let mut types = BTreeMap::new();
        for (name, spec) in raw {
            let honeypot_type: HoneypotType = name
                .parse()
                .map_err(|_| CatalogError::UnknownType(name.clone()))?;

            if let Some(range) = spec.passive_ports {
                if range.start > range.end || (range.start as u32) < MIN_HOST_PORT {
                    return Err(CatalogError::InvalidPassiveRange {
                        honeypot_type,
                        start: range.start,
                        end: range.end,
                    });
                }
            }

            types.insert(honeypot_type, spec);
        }

        Ok(Self { types })
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&yaml)
    }

    pub fn get(&self, honeypot_type: HoneypotType) -> Option<&HoneypotTypeSpec> {
        self.types.get(&honeypot_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HoneypotType, &HoneypotTypeSpec)> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Check a requested host port for a honeypot of the given type
    pub fn validate_port(&self, honeypot_type: HoneypotType, port: u32) -> ValidationResult {
        let Some(spec) = self.get(honeypot_type) else {
            return ValidationResult::invalid(format!(
                "Honeypot type {} is not available",
                honeypot_type
            ));
        };

        if !(MIN_HOST_PORT..=MAX_HOST_PORT).contains(&port) {
            return ValidationResult::invalid(format!(
                "Port must be between {} and {}",
                MIN_HOST_PORT, MAX_HOST_PORT
            ));
        }

        if let Some(range) = spec.passive_ports {
            if range.contains(port) {
                return ValidationResult::invalid(format!(
                    "Port {} is reserved for {} passive ports ({}-{})",
                    port, honeypot_type, range.start, range.end
                ));
            }
        }

        ValidationResult::valid()
    }

    /// Check a host port without knowing the honeypot type yet
    ///
    /// Rejects ports outside the allowed range and ports inside any passive
    /// range in the catalog.
    pub fn validate_host_port(&self, port: u32) -> ValidationResult {
        if !(MIN_HOST_PORT..=MAX_HOST_PORT).contains(&port) {
            return ValidationResult::invalid(format!(
                "Port must be between {} and {}",
                MIN_HOST_PORT, MAX_HOST_PORT
            ));
        }

        for (honeypot_type, spec) in &self.types {
            if let Some(range) = spec.passive_ports.filter(|r| r.contains(port)) {
                return ValidationResult::invalid(format!(
                    "Port {} is reserved for {} passive ports ({}-{})",
                    port, honeypot_type, range.start, range.end
                ));
            }
        }

        ValidationResult::valid()
    }

    /// Every host binding a honeypot of this type needs
    pub fn port_bindings(
        &self,
        honeypot_type: HoneypotType,
        host_port: u16,
    ) -> Result<Vec<PortBinding>, CatalogError> {
        let spec = self
            .get(honeypot_type)
            .ok_or(CatalogError::Undefined(honeypot_type))?;

        let mut bindings = vec![PortBinding {
            host_port,
            container_port: spec.container_port,
            protocol: spec.protocol.clone(),
        }];

        if let Some(range) = spec.passive_ports {
            bindings.extend(range.ports().map(|port| PortBinding {
                host_port: port,
                container_port: port,
                protocol: spec.protocol.clone(),
            }));
        }

        Ok(bindings)
    }
}

impl Default for HoneypotCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_catalog() {
        let catalog = HoneypotCatalog::builtin();
        assert_eq!(catalog.len(), 3);

        let ssh = catalog.get(HoneypotType::Ssh).unwrap();
        assert_eq!(ssh.container_port, 22);
        assert!(ssh.passive_ports.is_none());

        let ftp = catalog.get(HoneypotType::Ftp).unwrap();
        assert_eq!(ftp.passive_ports, Some(PortRange { start: 30000, end: 30009 }));

        let http = catalog.get(HoneypotType::Http).unwrap();
        assert_eq!(http.container_port, 80);
        assert_eq!(http.protocol, "tcp");
    }

    #[test]
    fn test_validate_port() {
        let catalog = HoneypotCatalog::builtin();
        assert!(catalog.validate_port(HoneypotType::Ssh, 2222).is_valid);
        assert!(catalog.validate_port(HoneypotType::Ssh, 1024).is_valid);
        assert!(catalog.validate_port(HoneypotType::Ssh, 65535).is_valid);
        assert!(!catalog.validate_port(HoneypotType::Ssh, 1023).is_valid);
        assert!(!catalog.validate_port(HoneypotType::Ssh, 65536).is_valid);

        let result = catalog.validate_port(HoneypotType::Ftp, 30005);
        assert!(!result.is_valid);
        assert!(result.message.contains("passive"));
        // The range only matters for FTP
        assert!(catalog.validate_port(HoneypotType::Http, 30005).is_valid);
    }

    #[test]
    fn test_validate_host_port() {
        let catalog = HoneypotCatalog::builtin();
        assert!(catalog.validate_host_port(8022).is_valid);
        assert!(!catalog.validate_host_port(80).is_valid);
        assert!(!catalog.validate_host_port(30000).is_valid);
        assert!(catalog.validate_host_port(30010).is_valid);
    }

    #[test]
    fn test_port_bindings() {
        let catalog = HoneypotCatalog::builtin();

        let ssh = catalog.port_bindings(HoneypotType::Ssh, 2222).unwrap();
        assert_eq!(ssh.len(), 1);
        assert_eq!(ssh[0].host_port, 2222);
        assert_eq!(ssh[0].container_port, 22);

        let ftp = catalog.port_bindings(HoneypotType::Ftp, 2121).unwrap();
        assert_eq!(ftp.len(), 11);
        assert_eq!(ftp[1].host_port, 30000);
        assert_eq!(ftp[10].container_port, 30009);
    }

    #[test]
    fn test_partial_catalog() {
        let catalog = HoneypotCatalog::load_from_str(
            "ssh:\n  image: custom/ssh:1.0\n  container_port: 2022\n",
        )
        .unwrap();

        assert_eq!(catalog.len(), 1);
        assert!(catalog.get(HoneypotType::Ftp).is_none());
        assert!(!catalog.validate_port(HoneypotType::Ftp, 2121).is_valid);
        assert!(matches!(
            catalog.port_bindings(HoneypotType::Http, 8080),
            Err(CatalogError::Undefined(HoneypotType::Http))
        ));
    }

    #[test]
    fn test_rejects_unknown_type() {
        let result = HoneypotCatalog::load_from_str("telnet:\n  image: x\n  container_port: 23\n");
        assert!(matches!(result, Err(CatalogError::UnknownType(name)) if name == "telnet"));
    }

    #[test]
    fn test_rejects_inverted_passive_range() {
        let yaml = "ftp:\n  image: x\n  container_port: 21\n  passive_ports:\n    start: 40010\n    end: 40000\n";
        assert!(matches!(
            HoneypotCatalog::load_from_str(yaml),
            Err(CatalogError::InvalidPassiveRange { .. })
        ));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "http:\n  image: hive/http:2\n  container_port: 8080").unwrap();

        let catalog = HoneypotCatalog::load_from_path(file.path()).unwrap();
        assert_eq!(catalog.get(HoneypotType::Http).unwrap().image, "hive/http:2");

        let missing = HoneypotCatalog::load_from_path("/nonexistent/catalog.yaml");
        assert!(matches!(missing, Err(CatalogError::Io { .. })));
    }
}
