//! Role policy for plant operations data.
//!
//! Every edit or delete on a plant record is governed by the submitting
//! user's role. This module is the single place that derives what a role may
//! do; page modules must consume [`Role::capabilities`] instead of
//! re-deriving individual flags, so the flags cannot drift apart.
//!
//! The resolver is a total, pure function: every role (including
//! unrecognized ones) maps to a defined capability set, with no I/O and no
//! side effects. Unrecognized roles resolve to read-only — fail safe, not
//! fail open.

use serde::{Deserialize, Serialize};

/// User role as carried by the session. Immutable for the session's lifetime.
///
/// Role names arrive as strings from the session layer; parsing is total and
/// anything unrecognized becomes [`Role::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    /// Assistant vice president: plant-wide oversight across sites.
    Avp,
    Supervisor,
    Operator,
    /// Contractor or other external party entering data on the plant's behalf.
    External,
    Viewer,
    /// Any role name this build does not recognize. Resolves read-only.
    #[serde(other)]
    Unknown,
}

impl Role {
    /// All recognized roles, for exhaustive tests and admin UIs.
    pub const ALL: [Role; 7] = [
        Role::Admin,
        Role::Manager,
        Role::Avp,
        Role::Supervisor,
        Role::Operator,
        Role::External,
        Role::Viewer,
    ];

    /// Parse a role name. Total: unrecognized names map to [`Role::Unknown`].
    pub fn parse(name: &str) -> Self {
        match name {
            "admin" => Role::Admin,
            "manager" => Role::Manager,
            "avp" => Role::Avp,
            "supervisor" => Role::Supervisor,
            "operator" => Role::Operator,
            "external" => Role::External,
            "viewer" => Role::Viewer,
            _ => Role::Unknown,
        }
    }

    /// Role name as stored in sessions and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Avp => "avp",
            Role::Supervisor => "supervisor",
            Role::Operator => "operator",
            Role::External => "external",
            Role::Viewer => "viewer",
            Role::Unknown => "unknown",
        }
    }

    /// Resolve this role's capability set.
    ///
    /// Pure and deterministic. Guarantees the policy invariants:
    /// direct and approval-gated flags are mutually exclusive per action,
    /// and a read-only role has every other flag false.
    pub fn capabilities(self) -> CapabilitySet {
        match self {
            Role::Admin | Role::Avp => CapabilitySet {
                can_create: true,
                can_edit_direct: true,
                can_delete_direct: true,
                requires_approval_for_edit: false,
                requires_approval_for_delete: false,
                is_read_only: false,
                can_review: true,
                cross_plant: true,
            },
            Role::Manager => CapabilitySet {
                can_create: true,
                can_edit_direct: true,
                can_delete_direct: true,
                requires_approval_for_edit: false,
                requires_approval_for_delete: false,
                is_read_only: false,
                can_review: true,
                cross_plant: false,
            },
            // Supervisors edit in place but deletions get a second pair of eyes.
            Role::Supervisor => CapabilitySet {
                can_create: true,
                can_edit_direct: true,
                can_delete_direct: false,
                requires_approval_for_edit: false,
                requires_approval_for_delete: true,
                is_read_only: false,
                can_review: true,
                cross_plant: false,
            },
            Role::Operator => CapabilitySet {
                can_create: true,
                can_edit_direct: false,
                can_delete_direct: false,
                requires_approval_for_edit: true,
                requires_approval_for_delete: true,
                is_read_only: false,
                can_review: false,
                cross_plant: false,
            },
            // External parties submit new entries only; corrections go
            // through plant staff.
            Role::External => CapabilitySet {
                can_create: true,
                can_edit_direct: false,
                can_delete_direct: false,
                requires_approval_for_edit: false,
                requires_approval_for_delete: false,
                is_read_only: false,
                can_review: false,
                cross_plant: false,
            },
            Role::Viewer | Role::Unknown => CapabilitySet::read_only(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Role::parse(s))
    }
}

/// What a role may do without review, derived from [`Role::capabilities`]
/// and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    /// May create new records.
    pub can_create: bool,

    /// Edits apply immediately, no review.
    pub can_edit_direct: bool,

    /// Deletes apply immediately, no review.
    pub can_delete_direct: bool,

    /// Edits are queued as approval requests. Mutually exclusive with
    /// `can_edit_direct`.
    pub requires_approval_for_edit: bool,

    /// Deletes are queued as approval requests. Mutually exclusive with
    /// `can_delete_direct`.
    pub requires_approval_for_delete: bool,

    /// No mutations at all. Implies every other flag is false.
    pub is_read_only: bool,

    /// May decide pending approval requests. A review-side predicate,
    /// distinct from the create-side flags above.
    pub can_review: bool,

    /// Authority spans all plants rather than the actor's own.
    pub cross_plant: bool,
}

impl CapabilitySet {
    /// The fail-safe set: no mutations, no review, no scope.
    pub fn read_only() -> Self {
        Self {
            can_create: false,
            can_edit_direct: false,
            can_delete_direct: false,
            requires_approval_for_edit: false,
            requires_approval_for_delete: false,
            is_read_only: true,
            can_review: false,
            cross_plant: false,
        }
    }

    /// May this capability set review requests scoped to `plant_scope`,
    /// given the actor's own plant?
    pub fn may_review_plant(&self, own_plant: &str, plant_scope: &str) -> bool {
        self.can_review && (self.cross_plant || own_plant == plant_scope)
    }
}
