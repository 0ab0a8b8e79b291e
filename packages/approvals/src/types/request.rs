//! Approval request records and their lifecycle vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::domain::DomainType;

/// The gated mutation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    Edit,
    Delete,
}

impl ApprovalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalAction::Edit => "edit",
            ApprovalAction::Delete => "delete",
        }
    }
}

impl std::fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApprovalAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "edit" => Ok(ApprovalAction::Edit),
            "delete" => Ok(ApprovalAction::Delete),
            other => Err(format!("unknown approval action: {other}")),
        }
    }
}

/// Request lifecycle state. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    /// Terminal states never transition again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(format!("unknown request status: {other}")),
        }
    }
}

/// A reviewer's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    Approved,
    Rejected,
}

impl DecisionOutcome {
    /// The status a request lands in for this outcome.
    pub fn status(&self) -> RequestStatus {
        match self {
            DecisionOutcome::Approved => RequestStatus::Approved,
            DecisionOutcome::Rejected => RequestStatus::Rejected,
        }
    }
}

/// A persisted, auditable record of a deferred mutation awaiting (or past)
/// a decision.
///
/// Created only by the mutation gate, decided exactly once by the review
/// service, never deleted. A pending or rejected request is guaranteed to
/// have had zero effect on the underlying record; `snapshot` holds the
/// proposed new state (edit) or the state about to be removed (delete) as
/// it was at submission time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub id: Uuid,
    pub domain_type: DomainType,
    pub action: ApprovalAction,
    pub target_record_id: Uuid,
    pub plant_scope: String,
    pub snapshot: JsonValue,

    /// Free-text justification from the submitter. Always non-empty.
    pub reason: String,

    pub submitted_by: Uuid,
    pub submitted_at: DateTime<Utc>,

    pub status: RequestStatus,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,

    /// Set only on rejection.
    pub reject_reason: Option<String>,

    /// When the approved mutation was applied to the domain record.
    /// `status == Approved && applied_at == None` is the
    /// approved-but-unapplied state: decided, awaiting (re)application.
    pub applied_at: Option<DateTime<Utc>>,
}

impl ApprovalRequest {
    /// Approved and already applied to the domain record.
    pub fn is_applied(&self) -> bool {
        self.status == RequestStatus::Approved && self.applied_at.is_some()
    }

    /// Approved but the domain mutation has not (yet) run.
    pub fn is_pending_apply(&self) -> bool {
        self.status == RequestStatus::Approved && self.applied_at.is_none()
    }
}

/// Input for creating a new approval request.
///
/// Id, submission timestamp, and `pending` status are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApprovalRequest {
    pub domain_type: DomainType,
    pub action: ApprovalAction,
    pub target_record_id: Uuid,
    pub plant_scope: String,
    pub snapshot: JsonValue,
    pub reason: String,
    pub submitted_by: Uuid,
}
