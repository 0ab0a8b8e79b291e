//! The authenticated caller as seen by this subsystem.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::policy::{CapabilitySet, Role};

/// The user on whose behalf a mutation or review is attempted.
///
/// Built by the session layer (out of scope here) after authentication;
/// role and plant assignment are immutable for the session's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,

    /// The plant this actor is assigned to. Roles with cross-plant
    /// authority may act beyond it.
    pub plant: String,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role, plant: impl Into<String>) -> Self {
        Self {
            user_id,
            role,
            plant: plant.into(),
        }
    }

    /// Resolve this actor's capability set.
    pub fn capabilities(&self) -> CapabilitySet {
        self.role.capabilities()
    }

    /// May this actor review requests scoped to `plant_scope`?
    pub fn may_review_plant(&self, plant_scope: &str) -> bool {
        self.capabilities().may_review_plant(&self.plant, plant_scope)
    }
}
