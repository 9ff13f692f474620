//! Honeypot and service lifecycle against the container backend
//!
//! This module provides:
//! - The [`LifecycleApi`] contract used by the gateway and the CLI
//! - An HTTP implementation that validates locally before calling out
//! - Latest-wins port availability checks
//! - A per-honeypot guard against overlapping lifecycle operations

mod client;
mod guard;
mod port_check;

pub use client::{HttpLifecycleClient, HttpLifecycleClientBuilder};
pub use guard::{InFlightOperations, OperationGuard};
pub use port_check::{PortCheckOutcome, PortChecker};

use crate::models::{
    CreateHoneypotRequest, HoneypotAction, HoneypotRecord, OperationResult, PortAvailability,
    ServiceAction, ServiceRecord,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Rejected locally; no request was sent
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("background task failed: {0}")]
    Task(String),
}

impl LifecycleError {
    /// HTTP status returned by the backend, if the request got that far
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            LifecycleError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// How a restart is carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum RestartStrategy {
    /// Single call to the backend's restart endpoint
    Endpoint,
    /// Stop, wait, then start
    StopThenStart {
        #[serde(with = "duration_millis")]
        delay: Duration,
    },
}

pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_secs(2);

impl Default for RestartStrategy {
    fn default() -> Self {
        RestartStrategy::Endpoint
    }
}

impl FromStr for RestartStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "endpoint" => Ok(RestartStrategy::Endpoint),
            "stop-then-start" => Ok(RestartStrategy::StopThenStart {
                delay: DEFAULT_RESTART_DELAY,
            }),
            other => Err(format!("Unknown restart strategy: {}", other)),
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// Operations the container backend exposes for honeypots and services
#[async_trait]
pub trait LifecycleApi: Send + Sync {
    async fn create_honeypot(
        &self,
        request: &CreateHoneypotRequest,
    ) -> Result<HoneypotRecord, LifecycleError>;

    async fn list_honeypots(&self) -> Result<Vec<HoneypotRecord>, LifecycleError>;

    async fn honeypot_status(&self, name: &str) -> Result<HoneypotRecord, LifecycleError>;

    async fn start_honeypot(&self, name: &str) -> Result<OperationResult, LifecycleError>;

    async fn stop_honeypot(&self, name: &str) -> Result<OperationResult, LifecycleError>;

    async fn restart_honeypot(&self, name: &str) -> Result<OperationResult, LifecycleError>;

    async fn delete_honeypot(&self, name: &str) -> Result<OperationResult, LifecycleError>;

    /// Dispatch a single-honeypot action to the matching call
    async fn apply_action(
        &self,
        name: &str,
        action: HoneypotAction,
    ) -> Result<OperationResult, LifecycleError> {
        match action {
            HoneypotAction::Start => self.start_honeypot(name).await,
            HoneypotAction::Stop => self.stop_honeypot(name).await,
            HoneypotAction::Restart => self.restart_honeypot(name).await,
            HoneypotAction::Delete => self.delete_honeypot(name).await,
        }
    }

    async fn check_port_availability(&self, port: u16)
        -> Result<PortAvailability, LifecycleError>;

    async fn list_services(&self) -> Result<Vec<ServiceRecord>, LifecycleError>;

    /// Apply `action` to the whole service set
    async fn service_action(
        &self,
        action: ServiceAction,
        admin_password: &str,
    ) -> Result<OperationResult, LifecycleError>;

    async fn create_services(&self, admin_password: &str) -> Result<OperationResult, LifecycleError> {
        self.service_action(ServiceAction::Create, admin_password).await
    }

    async fn start_services(&self, admin_password: &str) -> Result<OperationResult, LifecycleError> {
        self.service_action(ServiceAction::Start, admin_password).await
    }

    async fn stop_services(&self, admin_password: &str) -> Result<OperationResult, LifecycleError> {
        self.service_action(ServiceAction::Stop, admin_password).await
    }

    async fn restart_services(
        &self,
        admin_password: &str,
    ) -> Result<OperationResult, LifecycleError> {
        self.service_action(ServiceAction::Restart, admin_password).await
    }

    async fn delete_services(&self, admin_password: &str) -> Result<OperationResult, LifecycleError> {
        self.service_action(ServiceAction::Delete, admin_password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restart_strategy_parse() {
        assert_eq!("endpoint".parse::<RestartStrategy>().unwrap(), RestartStrategy::Endpoint);
        assert_eq!(
            "stop-then-start".parse::<RestartStrategy>().unwrap(),
            RestartStrategy::StopThenStart {
                delay: DEFAULT_RESTART_DELAY
            }
        );
        assert!("reboot".parse::<RestartStrategy>().is_err());
    }

    #[test]
    fn test_restart_strategy_serde() {
        let json = serde_json::to_value(RestartStrategy::StopThenStart {
            delay: Duration::from_millis(1500),
        })
        .unwrap();
        assert_eq!(json["kind"], "stop-then-start");
        assert_eq!(json["delay"], 1500);
    }

    #[test]
    fn test_error_display() {
        let err = LifecycleError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "validation failed: a; b");

        let err = LifecycleError::Api {
            status: 404,
            body: "no such honeypot".into(),
        };
        assert_eq!(err.upstream_status(), Some(404));
    }
}
