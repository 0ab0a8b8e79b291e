//! Domain registry for routing mutations to their owning domain module.
//!
//! The registry maps [`DomainType`] discriminants to the mutator each domain
//! registered at startup. The gate and review service use it to dispatch
//! edits and deletes without knowing any domain's concrete types.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ApprovalError, Result};
use crate::traits::domain::DomainMutator;
use crate::types::DomainType;

/// Registry that maps domain types to their mutators.
///
/// Each domain registers once at startup; lookups of unregistered domains
/// fail with `DomainNotRegistered` rather than panicking.
#[derive(Default)]
pub struct DomainRegistry {
    mutators: HashMap<DomainType, Arc<dyn DomainMutator>>,
}

impl DomainRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            mutators: HashMap::new(),
        }
    }

    /// Register a domain's mutator. Replaces any previous registration for
    /// the same domain.
    pub fn register(&mut self, domain_type: DomainType, mutator: Arc<dyn DomainMutator>) {
        self.mutators.insert(domain_type, mutator);
    }

    /// Builder-style registration, for wiring at startup.
    pub fn with(mut self, domain_type: DomainType, mutator: Arc<dyn DomainMutator>) -> Self {
        self.register(domain_type, mutator);
        self
    }

    /// Look up the mutator for a domain.
    pub fn get(&self, domain_type: DomainType) -> Result<Arc<dyn DomainMutator>> {
        self.mutators
            .get(&domain_type)
            .cloned()
            .ok_or(ApprovalError::DomainNotRegistered {
                domain: domain_type,
            })
    }

    /// Check whether a domain is registered.
    pub fn is_registered(&self, domain_type: DomainType) -> bool {
        self.mutators.contains_key(&domain_type)
    }

    /// All registered domain types.
    pub fn registered_types(&self) -> Vec<DomainType> {
        self.mutators.keys().copied().collect()
    }
}
