//! The interface each data domain exposes to the gate.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Result type for domain callbacks. Domain modules keep their own error
/// types; the gate wraps whatever comes back into its `Domain` error kind.
pub type DomainResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// The two mutation callbacks (plus a read accessor) a domain module hands
/// to the gate. The gate never interprets record fields — it reads and
/// writes the record as an opaque JSON blob.
///
/// `apply_edit` and `apply_delete` must be idempotent-safe: a caller that
/// saw a retryable failure may invoke them again for the same record.
#[async_trait]
pub trait DomainMutator: Send + Sync {
    /// Read the record's current state, or `None` if it does not exist.
    ///
    /// Used to capture the delete-path snapshot before anything is removed,
    /// so a rejected or pending request retains what would have been lost.
    async fn fetch_record(&self, record_id: Uuid) -> DomainResult<Option<JsonValue>>;

    /// Replace the record's state with `proposed_state`.
    async fn apply_edit(&self, record_id: Uuid, proposed_state: &JsonValue) -> DomainResult<()>;

    /// Remove the record.
    async fn apply_delete(&self, record_id: Uuid) -> DomainResult<()>;
}
