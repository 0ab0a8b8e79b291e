//! Persistence trait for approval requests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{ApprovalRequest, DecisionOutcome, NewApprovalRequest, RequestFilter};

/// Durable persistence for approval requests and their status transitions.
///
/// Requests are created directly into `pending` and are never deleted —
/// decided requests stay around as the audit trail. `decide` is the only
/// mutator of `status`, and it is a guarded transition: once a request is
/// terminal its `status`, `decided_by`, and `decided_at` are immutable.
///
/// Readers never block writers; `list`/`get` may observe slightly stale data
/// under eventually consistent backends, which is acceptable because status
/// transitions are monotonic (pending → terminal, never reversed).
#[async_trait]
pub trait ApprovalRequestStore: Send + Sync {
    /// Persist a new request with `status = pending`, assigning its id and
    /// submission timestamp.
    ///
    /// A `Storage` failure means the request was not created — callers must
    /// not treat it as ambiguous.
    async fn create(&self, new_request: NewApprovalRequest) -> Result<ApprovalRequest>;

    /// Fetch a request by id.
    async fn get(&self, id: Uuid) -> Result<Option<ApprovalRequest>>;

    /// List requests matching the filter, newest-first by submission time.
    async fn list(&self, filter: &RequestFilter) -> Result<Vec<ApprovalRequest>>;

    /// Atomically transition a pending request to its terminal status.
    ///
    /// This is a compare-and-swap on `status = pending`: of two concurrent
    /// decisions on the same id, exactly one succeeds and the other fails
    /// with `AlreadyDecided`, leaving the first decision untouched.
    ///
    /// `reject_reason` is required (non-empty) when the outcome is
    /// `Rejected` and ignored when `Approved`; the requirement is checked
    /// before any state changes.
    async fn decide(
        &self,
        id: Uuid,
        outcome: DecisionOutcome,
        decided_by: Uuid,
        reject_reason: Option<String>,
    ) -> Result<ApprovalRequest>;

    /// Record that the approved mutation has been applied to the domain
    /// record, completing the two-phase approval.
    ///
    /// Guarded the same way as `decide`: only an approved, not-yet-applied
    /// request transitions; anything else fails with `AlreadyDecided`
    /// (or `RequestNotFound`).
    async fn mark_applied(&self, id: Uuid) -> Result<ApprovalRequest>;
}
