//! Capability policy
//!
//! Decides which capabilities a run gets before the engine is built.
//! Every decision is recorded in an audit log.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use sust_core::{Capability, CapabilityRegistry};
use tracing::debug;

/// Allow-list of capabilities plus an audit log
#[derive(Debug, Clone, Default)]
pub struct Policy {
    allowed: Vec<Capability>,
    audit: Arc<Mutex<Vec<String>>>,
}

impl Policy {
    /// Policy with an explicit allow-list
    pub fn new(allowed: Vec<Capability>) -> Self {
        Policy {
            allowed,
            audit: Arc::default(),
        }
    }

    /// Everything allowed
    pub fn permissive() -> Self {
        Self::new(Capability::ALL.to_vec())
    }

    /// Nothing allowed
    pub fn sandbox() -> Self {
        Self::new(Vec::new())
    }

    pub fn allow(mut self, cap: Capability) -> Self {
        if !self.allowed.contains(&cap) {
            self.allowed.push(cap);
        }
        self
    }

    pub fn allows(&self, cap: Capability) -> bool {
        self.allowed.contains(&cap)
    }

    pub fn record(&self, entry: String) {
        self.audit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// Snapshot of the audit log
    pub fn audit_log(&self) -> Vec<String> {
        self.audit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Load an allow-list from a newline- or comma-separated file of
    /// capability names
    pub fn load_allow_list(path: &Path) -> io::Result<Vec<Capability>> {
        let text = fs::read_to_string(path)?;
        text.split(['\n', ',', '\r'])
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.parse::<Capability>()
                    .map_err(|msg: String| io::Error::new(io::ErrorKind::InvalidData, msg))
            })
            .collect()
    }

    /// Registry granting exactly the allowed capabilities
    pub fn registry(&self) -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::new();
        for cap in Capability::ALL {
            if self.allows(cap) {
                registry.grant(cap);
                self.record(format!("granted {}", cap));
            } else {
                self.record(format!("denied {}", cap));
            }
        }
        debug!(granted = ?self.allowed, "capability policy applied");
        registry
    }
}
