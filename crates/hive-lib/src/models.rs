//! Core data models for honeypots and the auxiliary service set

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of decoy service a honeypot exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoneypotType {
    Ssh,
    Ftp,
    Http,
}

impl HoneypotType {
    pub const ALL: [HoneypotType; 3] = [HoneypotType::Ssh, HoneypotType::Ftp, HoneypotType::Http];

    pub fn as_str(&self) -> &'static str {
        match self {
            HoneypotType::Ssh => "ssh",
            HoneypotType::Ftp => "ftp",
            HoneypotType::Http => "http",
        }
    }
}

impl fmt::Display for HoneypotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HoneypotType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ssh" => Ok(HoneypotType::Ssh),
            "ftp" => Ok(HoneypotType::Ftp),
            "http" => Ok(HoneypotType::Http),
            other => Err(format!("Unknown honeypot type: {}", other)),
        }
    }
}

/// Container status as reported by the backend
///
/// `not found → created → running ⇄ exited`. Transitions are driven by the
/// container runtime; this crate only reflects what the backend reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoneypotStatus {
    #[serde(rename = "created")]
    Created,
    #[serde(rename = "running")]
    Running,
    #[serde(rename = "exited")]
    Exited,
    #[serde(rename = "not found")]
    NotFound,
}

impl HoneypotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoneypotStatus::Created => "created",
            HoneypotStatus::Running => "running",
            HoneypotStatus::Exited => "exited",
            HoneypotStatus::NotFound => "not found",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, HoneypotStatus::Running)
    }
}

impl fmt::Display for HoneypotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selectable container memory limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemoryLimit {
    Mb64,
    Mb128,
    Mb256,
    Mb512,
    Mb768,
    Mb1024,
    Mb1536,
    Mb2048,
}

impl MemoryLimit {
    /// All options in ascending order
    pub const ALL: [MemoryLimit; 8] = [
        MemoryLimit::Mb64,
        MemoryLimit::Mb128,
        MemoryLimit::Mb256,
        MemoryLimit::Mb512,
        MemoryLimit::Mb768,
        MemoryLimit::Mb1024,
        MemoryLimit::Mb1536,
        MemoryLimit::Mb2048,
    ];

    pub fn megabytes(&self) -> u64 {
        match self {
            MemoryLimit::Mb64 => 64,
            MemoryLimit::Mb128 => 128,
            MemoryLimit::Mb256 => 256,
            MemoryLimit::Mb512 => 512,
            MemoryLimit::Mb768 => 768,
            MemoryLimit::Mb1024 => 1024,
            MemoryLimit::Mb1536 => 1536,
            MemoryLimit::Mb2048 => 2048,
        }
    }

    pub fn bytes(&self) -> u64 {
        self.megabytes() * 1024 * 1024
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryLimit::Mb64 => "64m",
            MemoryLimit::Mb128 => "128m",
            MemoryLimit::Mb256 => "256m",
            MemoryLimit::Mb512 => "512m",
            MemoryLimit::Mb768 => "768m",
            MemoryLimit::Mb1024 => "1024m",
            MemoryLimit::Mb1536 => "1536m",
            MemoryLimit::Mb2048 => "2048m",
        }
    }

    /// Next larger option, or `self` when already at the maximum
    pub fn next(&self) -> MemoryLimit {
        let idx = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL.get(idx + 1).copied().unwrap_or(*self)
    }
}

impl fmt::Display for MemoryLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .find(|m| m.as_str() == normalized)
            .copied()
            .ok_or_else(|| format!("Unknown memory option: {}", s))
    }
}

/// One username/password combination accepted by a honeypot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialPair {
    pub username: String,
    pub password: String,
}

impl CredentialPair {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl FromStr for CredentialPair {
    type Err = String;

    /// Parses `username:password`; the password may itself contain `:`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((user, pass)) => Ok(CredentialPair::new(user, pass)),
            None => Err(format!("Expected username:password, got '{}'", s)),
        }
    }
}

/// Container resource limits as submitted by a builder form
///
/// Numeric fields are signed so that out-of-range input (including negative
/// values) reaches the validators instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub cpu_period: i64,
    pub cpu_quota: i64,
    pub memory_limit: String,
    pub memory_swap_limit: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            cpu_period: 100_000,
            cpu_quota: 50_000,
            memory_limit: MemoryLimit::Mb512.to_string(),
            memory_swap_limit: MemoryLimit::Mb768.to_string(),
        }
    }
}

impl ResourceConfig {
    /// Raise swap to the option above the memory limit when swap is smaller.
    ///
    /// Returns true when the swap limit was changed.
    pub fn autocorrect_swap(&mut self) -> bool {
        let (Ok(memory), Ok(swap)) = (
            self.memory_limit.parse::<MemoryLimit>(),
            self.memory_swap_limit.parse::<MemoryLimit>(),
        ) else {
            return false;
        };

        if swap >= memory {
            return false;
        }

        self.memory_swap_limit = memory.next().to_string();
        true
    }
}

/// Builder submission for a new honeypot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateHoneypotRequest {
    #[serde(rename = "type")]
    pub honeypot_type: HoneypotType,
    pub port: u32,
    #[serde(flatten)]
    pub resources: ResourceConfig,
    pub banner: String,
    pub authentication: Vec<CredentialPair>,
}

/// Honeypot as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoneypotRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub honeypot_type: HoneypotType,
    pub port: u16,
    pub status: HoneypotStatus,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_period: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_quota: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_swap_limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(default)]
    pub authentication: Vec<CredentialPair>,
}

impl HoneypotRecord {
    /// CPU share granted by quota/period (1.0 = one full core)
    pub fn cpu_share(&self) -> Option<f64> {
        match (self.cpu_quota, self.cpu_period) {
            (Some(quota), Some(period)) if period > 0 => Some(quota as f64 / period as f64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoneypotList {
    pub honeypots: Vec<HoneypotRecord>,
}

/// Lifecycle action on a single honeypot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoneypotAction {
    Start,
    Stop,
    Restart,
    Delete,
}

impl HoneypotAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HoneypotAction::Start => "start",
            HoneypotAction::Stop => "stop",
            HoneypotAction::Restart => "restart",
            HoneypotAction::Delete => "delete",
        }
    }
}

impl fmt::Display for HoneypotAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HoneypotAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(HoneypotAction::Start),
            "stop" => Ok(HoneypotAction::Stop),
            "restart" => Ok(HoneypotAction::Restart),
            "delete" => Ok(HoneypotAction::Delete),
            other => Err(format!("Unknown honeypot action: {}", other)),
        }
    }
}

/// Outcome of a single lifecycle request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub name: String,
    pub action: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<HoneypotStatus>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortAvailability {
    pub port: u16,
    pub available: bool,
    pub message: String,
}

/// Auxiliary infrastructure managed alongside the honeypots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    OpensearchNode,
    NatsServer,
    LogCollector,
    OpensearchDashboard,
}

impl ServiceKind {
    /// The fixed service set; bulk actions always cover all of these
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::OpensearchNode,
        ServiceKind::NatsServer,
        ServiceKind::LogCollector,
        ServiceKind::OpensearchDashboard,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ServiceKind::OpensearchNode => "opensearch-node",
            ServiceKind::NatsServer => "nats-server",
            ServiceKind::LogCollector => "log-collector",
            ServiceKind::OpensearchDashboard => "opensearch-dashboard",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ServiceKind::OpensearchNode => "Stores and indexes honeypot events",
            ServiceKind::NatsServer => "Message bus carrying events from honeypots",
            ServiceKind::LogCollector => "Forwards honeypot events from NATS to OpenSearch",
            ServiceKind::OpensearchDashboard => "Dashboards for browsing captured activity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub name: String,
    pub id: String,
    pub status: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceList {
    pub services: Vec<ServiceRecord>,
}

/// Bulk action applied to every service in [`ServiceKind::ALL`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAction {
    Create,
    Start,
    Stop,
    Restart,
    Delete,
}

impl ServiceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceAction::Create => "create",
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
            ServiceAction::Delete => "delete",
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(ServiceAction::Create),
            "start" => Ok(ServiceAction::Start),
            "stop" => Ok(ServiceAction::Stop),
            "restart" => Ok(ServiceAction::Restart),
            "delete" => Ok(ServiceAction::Delete),
            other => Err(format!("Unknown service action: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceActionRequest {
    pub admin_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_limit_bytes() {
        assert_eq!(MemoryLimit::Mb64.bytes(), 64 * 1024 * 1024);
        assert_eq!(MemoryLimit::Mb2048.bytes(), 2048 * 1024 * 1024);
    }

    #[test]
    fn test_memory_limit_next() {
        assert_eq!(MemoryLimit::Mb512.next(), MemoryLimit::Mb768);
        assert_eq!(MemoryLimit::Mb1024.next(), MemoryLimit::Mb1536);
        assert_eq!(MemoryLimit::Mb2048.next(), MemoryLimit::Mb2048);
    }

    #[test]
    fn test_memory_limit_parse() {
        assert_eq!("256m".parse::<MemoryLimit>().unwrap(), MemoryLimit::Mb256);
        assert_eq!(" 1024M ".parse::<MemoryLimit>().unwrap(), MemoryLimit::Mb1024);
        assert!("300m".parse::<MemoryLimit>().is_err());
        assert!("".parse::<MemoryLimit>().is_err());
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&HoneypotStatus::NotFound).unwrap();
        assert_eq!(json, "\"not found\"");
        let status: HoneypotStatus = serde_json::from_str("\"exited\"").unwrap();
        assert_eq!(status, HoneypotStatus::Exited);
    }

    #[test]
    fn test_credential_pair_parse() {
        let pair: CredentialPair = "admin:pa:ss".parse().unwrap();
        assert_eq!(pair, CredentialPair::new("admin", "pa:ss"));
        assert!("nocolon".parse::<CredentialPair>().is_err());
    }

    #[test]
    fn test_autocorrect_swap() {
        let mut config = ResourceConfig {
            memory_limit: "512m".to_string(),
            memory_swap_limit: "256m".to_string(),
            ..Default::default()
        };
        assert!(config.autocorrect_swap());
        assert_eq!(config.memory_swap_limit, "768m");

        // Already valid, nothing to do
        assert!(!config.autocorrect_swap());

        let mut maxed = ResourceConfig {
            memory_limit: "2048m".to_string(),
            memory_swap_limit: "64m".to_string(),
            ..Default::default()
        };
        assert!(maxed.autocorrect_swap());
        assert_eq!(maxed.memory_swap_limit, "2048m");
    }

    #[test]
    fn test_create_request_wire_format() {
        let json = serde_json::json!({
            "type": "ftp",
            "port": 2121,
            "cpu_period": 100000,
            "cpu_quota": 50000,
            "memory_limit": "256m",
            "memory_swap_limit": "512m",
            "banner": "Welcome to the file server",
            "authentication": [{"username": "admin", "password": "secret1"}]
        });
        let req: CreateHoneypotRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.honeypot_type, HoneypotType::Ftp);
        assert_eq!(req.resources.memory_swap_limit, "512m");
        assert_eq!(req.authentication.len(), 1);
    }

    #[test]
    fn test_record_cpu_share() {
        let json = serde_json::json!({
            "name": "hive-http-8080",
            "type": "http",
            "port": 8080,
            "status": "running",
            "cpu_period": 100000,
            "cpu_quota": 25000
        });
        let mut record: HoneypotRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.cpu_share(), Some(0.25));

        record.cpu_period = Some(0);
        assert_eq!(record.cpu_share(), None);
        record.cpu_quota = None;
        assert_eq!(record.cpu_share(), None);
    }

    #[test]
    fn test_honeypot_action_parse() {
        assert_eq!("delete".parse::<HoneypotAction>().unwrap(), HoneypotAction::Delete);
        assert_eq!(HoneypotAction::Restart.to_string(), "restart");
        assert!("pause".parse::<HoneypotAction>().is_err());
    }

    #[test]
    fn test_service_action_parse() {
        assert_eq!("restart".parse::<ServiceAction>().unwrap(), ServiceAction::Restart);
        assert!("reboot".parse::<ServiceAction>().is_err());
        assert_eq!(ServiceKind::ALL.len(), 4);
    }
}
