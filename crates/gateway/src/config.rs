//! Gateway configuration

use anyhow::{Context, Result};
use hive_lib::RestartStrategy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Gateway configuration
///
/// Read from an optional `hive-gateway.{toml,yaml,json}` file in the working
/// directory, then overridden by `HIVE_*` environment variables
/// (for example `HIVE_UPSTREAM_URL`).
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Name reported in structured logs
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// Port the HTTP API listens on
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Container backend that performs provisioning
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Timeout for each upstream request in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// `endpoint` or `stop-then-start`
    #[serde(default = "default_restart_strategy")]
    pub restart_strategy: String,

    /// Pause between stop and start for `stop-then-start`
    #[serde(default = "default_restart_delay")]
    pub restart_delay_ms: u64,

    /// Honeypot type catalog; the built-in catalog is used when unset
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Upper bound on UI sessions with their own port checker
    #[serde(default = "default_port_check_sessions")]
    pub port_check_max_sessions: usize,

    /// Sessions idle this long are dropped first when the bound is reached
    #[serde(default = "default_port_check_idle")]
    pub port_check_session_idle_secs: u64,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "hive-gateway".to_string())
}

fn default_listen_port() -> u16 {
    8080
}

fn default_upstream_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_restart_strategy() -> String {
    "endpoint".to_string()
}

fn default_restart_delay() -> u64 {
    2000
}

fn default_port_check_sessions() -> usize {
    1024
}

fn default_port_check_idle() -> u64 {
    300
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            listen_port: default_listen_port(),
            upstream_url: default_upstream_url(),
            request_timeout_secs: default_request_timeout(),
            restart_strategy: default_restart_strategy(),
            restart_delay_ms: default_restart_delay(),
            catalog_path: None,
            port_check_max_sessions: default_port_check_sessions(),
            port_check_session_idle_secs: default_port_check_idle(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from the optional config file and environment
    pub fn load() -> Result<Self> {
        Self::from_file_source(config::File::with_name("hive-gateway").required(false))
    }

    /// Load configuration from a specific file (format from its extension)
    pub fn load_file(path: &Path) -> Result<Self> {
        Self::from_file_source(config::File::from(path).required(true))
    }

    fn from_file_source<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix("HIVE"))
            .build()
            .context("Failed to read gateway configuration")?;

        let parsed: Self = config
            .try_deserialize()
            .context("Invalid gateway configuration")?;

        // Reject a bad strategy at startup rather than on the first restart
        parsed.restart()?;
        Ok(parsed)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn port_check_session_idle(&self) -> Duration {
        Duration::from_secs(self.port_check_session_idle_secs)
    }

    pub fn restart(&self) -> Result<RestartStrategy> {
        let strategy: RestartStrategy = self
            .restart_strategy
            .parse()
            .map_err(anyhow::Error::msg)?;

        Ok(match strategy {
            RestartStrategy::StopThenStart { .. } => RestartStrategy::StopThenStart {
                delay: Duration::from_millis(self.restart_delay_ms),
            },
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.listen_port, 8080);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.restart().unwrap(), RestartStrategy::Endpoint);
        assert!(config.catalog_path.is_none());
        assert_eq!(config.port_check_max_sessions, 1024);
        assert_eq!(config.port_check_session_idle(), Duration::from_secs(300));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "listen_port: 9090\nupstream_url: http://podman-api:5000\nrestart_strategy: stop-then-start\nrestart_delay_ms: 500\nport_check_max_sessions: 64"
        )
        .unwrap();

        let config = GatewayConfig::load_file(file.path()).unwrap();
        assert_eq!(config.listen_port, 9090);
        assert_eq!(config.upstream_url, "http://podman-api:5000");
        assert_eq!(config.port_check_max_sessions, 64);
        assert_eq!(
            config.restart().unwrap(),
            RestartStrategy::StopThenStart {
                delay: Duration::from_millis(500)
            }
        );
    }

    #[test]
    fn test_rejects_unknown_restart_strategy() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "restart_strategy: reboot").unwrap();

        assert!(GatewayConfig::load_file(file.path()).is_err());
    }
}
