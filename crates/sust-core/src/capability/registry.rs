//! Capability Registry
//!
//! Keeps the granted capabilities of one engine.
//! Behavior: default deny-all; checks fail-closed.

use std::collections::HashSet;

use crate::error::{ErrorKind, Result};

use super::capability::Capability;

#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    granted: HashSet<Capability>,
}

impl CapabilityRegistry {
    /// New registry denies everything by default
    pub fn new() -> Self {
        CapabilityRegistry {
            granted: HashSet::new(),
        }
    }

    /// Grant a capability (host-level operation)
    pub fn grant(&mut self, cap: Capability) {
        self.granted.insert(cap);
    }

    pub fn is_granted(&self, cap: Capability) -> bool {
        self.granted.contains(&cap)
    }

    /// Fail-closed check
    pub fn check(&self, cap: Capability) -> Result<()> {
        if self.is_granted(cap) {
            Ok(())
        } else {
            Err(ErrorKind::CapabilityDenied(cap))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denies_by_default() {
        let registry = CapabilityRegistry::new();
        assert_eq!(
            registry.check(Capability::Network),
            Err(ErrorKind::CapabilityDenied(Capability::Network))
        );
    }

    #[test]
    fn grants_one_at_a_time() {
        let mut registry = CapabilityRegistry::new();
        registry.grant(Capability::FileRead);
        assert!(registry.check(Capability::FileRead).is_ok());
        assert!(registry.check(Capability::FileWrite).is_err());
        assert!(!registry.is_granted(Capability::Threads));
    }
}
