//! Latest-wins port availability checks
//!
//! While a user types a port number, each keystroke may start a new check.
//! Only the newest one matters: starting a check aborts the previous request
//! and callers still waiting on an older check get [`PortCheckOutcome::Superseded`].

use super::{LifecycleApi, LifecycleError};
use crate::models::PortAvailability;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::AbortHandle;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum PortCheckOutcome {
    Checked(PortAvailability),
    /// A newer check started before this one finished
    Superseded { token: u64 },
}

pub struct PortChecker {
    api: Arc<dyn LifecycleApi>,
    generation: AtomicU64,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl PortChecker {
    pub fn new(api: Arc<dyn LifecycleApi>) -> Self {
        Self {
            api,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    /// Token of the most recently started check
    pub fn latest_token(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn check(&self, port: u16) -> Result<PortCheckOutcome, LifecycleError> {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let api = Arc::clone(&self.api);
        let task = tokio::spawn(async move { api.check_port_availability(port).await });

        {
            let mut slot = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            if self.generation.load(Ordering::SeqCst) != token {
                // A newer check registered first; this one is already stale.
                task.abort();
            } else if let Some(previous) = slot.replace(task.abort_handle()) {
                previous.abort();
            }
        }

        match task.await {
            Ok(result) => {
                if self.generation.load(Ordering::SeqCst) != token {
                    debug!(port, token, "Discarding stale port check result");
                    return Ok(PortCheckOutcome::Superseded { token });
                }
                result.map(PortCheckOutcome::Checked)
            }
            Err(e) if e.is_cancelled() => {
                debug!(port, token, "Port check aborted by a newer check");
                Ok(PortCheckOutcome::Superseded { token })
            }
            Err(e) => Err(LifecycleError::Task(e.to_string())),
        }
    }
}
