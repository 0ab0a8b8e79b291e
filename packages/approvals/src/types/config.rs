//! Configuration and query filter types.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::DomainType;
use super::request::{ApprovalRequest, RequestStatus};

/// Timeouts applied to every store and domain call the gate and review
/// service make. No operation in this subsystem may block indefinitely;
/// an elapsed timeout surfaces as a storage or domain error.
#[derive(Debug, Clone, Copy)]
pub struct GateConfig {
    /// Bound on approval-request store calls. Default: 5s.
    pub storage_timeout: Duration,

    /// Bound on domain mutation and record-fetch calls. Default: 10s.
    pub domain_timeout: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            storage_timeout: Duration::from_secs(5),
            domain_timeout: Duration::from_secs(10),
        }
    }
}

impl GateConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage call timeout.
    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    /// Set the domain call timeout.
    pub fn with_domain_timeout(mut self, timeout: Duration) -> Self {
        self.domain_timeout = timeout;
        self
    }
}

/// Filter for listing approval requests. Empty filter matches everything;
/// results are always newest-first by submission time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub domain_type: Option<DomainType>,
    pub plant_scope: Option<String>,
    pub submitted_by: Option<Uuid>,
}

impl RequestFilter {
    /// Create a new empty filter (matches all).
    pub fn new() -> Self {
        Self::default()
    }

    /// Only requests in this status.
    pub fn with_status(mut self, status: RequestStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Only requests against this domain.
    pub fn with_domain(mut self, domain_type: DomainType) -> Self {
        self.domain_type = Some(domain_type);
        self
    }

    /// Only requests scoped to this plant.
    pub fn for_plant(mut self, plant_scope: impl Into<String>) -> Self {
        self.plant_scope = Some(plant_scope.into());
        self
    }

    /// Only requests submitted by this user.
    pub fn submitted_by(mut self, user_id: Uuid) -> Self {
        self.submitted_by = Some(user_id);
        self
    }

    /// Check whether a request matches this filter.
    pub fn matches(&self, request: &ApprovalRequest) -> bool {
        if let Some(status) = self.status {
            if request.status != status {
                return false;
            }
        }
        if let Some(domain_type) = self.domain_type {
            if request.domain_type != domain_type {
                return false;
            }
        }
        if let Some(plant_scope) = &self.plant_scope {
            if &request.plant_scope != plant_scope {
                return false;
            }
        }
        if let Some(submitted_by) = self.submitted_by {
            if request.submitted_by != submitted_by {
                return false;
            }
        }
        true
    }
}
