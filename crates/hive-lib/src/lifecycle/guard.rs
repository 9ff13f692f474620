//! Per-honeypot in-flight operation tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Names of honeypots with a lifecycle operation currently running
#[derive(Debug, Clone, Default)]
pub struct InFlightOperations {
    active: Arc<Mutex<HashMap<String, &'static str>>>,
}

impl InFlightOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name` for `action`.
    ///
    /// Returns `Err` with the action already running when the name is taken.
    /// The claim is released when the returned guard is dropped.
    pub fn try_begin(&self, name: &str, action: &'static str) -> Result<OperationGuard, &'static str> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(running) = active.get(name) {
            return Err(*running);
        }
        active.insert(name.to_string(), action);

        Ok(OperationGuard {
            name: name.to_string(),
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.active.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Releases its honeypot name on drop
#[derive(Debug)]
pub struct OperationGuard {
    name: String,
    active: Arc<Mutex<HashMap<String, &'static str>>>,
}

impl OperationGuard {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.name);
    }
}
