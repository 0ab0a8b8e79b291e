//! Role-Gated Mutation Approvals
//!
//! Every edit or delete on a plant operations record (fuel logs, gate
//! passes, trouble tickets, ...) passes through a single mutation gate.
//! Depending on the submitting user's role the change either applies
//! immediately or is recorded as a pending approval request that a
//! reviewer decides later — with the audit guarantee that an undecided or
//! rejected request never touched the underlying record.
//!
//! # Design
//!
//! - One pure policy resolver instead of per-page capability checks
//! - One generic gate parameterized by domain callbacks, not one gate per
//!   business entity
//! - Approval is two-phase: decide (guarded, exactly-once), then apply the
//!   deferred mutation; a failed apply is distinguishable and retryable
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use approvals::{
//!     Actor, DomainRegistry, DomainType, MemoryStore, MutationGate,
//!     MutationOutcome, ReviewService, Role,
//! };
//!
//! let store = Arc::new(MemoryStore::new());
//! let domains = Arc::new(DomainRegistry::new().with(DomainType::FuelLog, fuel_log_mutator));
//!
//! let gate = MutationGate::new(store.clone(), domains.clone());
//! let review = ReviewService::new(store, domains);
//!
//! // An operator's edit queues instead of applying:
//! let operator = Actor::new(user_id, Role::Operator, "unit-1");
//! let outcome = gate
//!     .request_edit(&operator, DomainType::FuelLog, record_id, "unit-1", new_state, Some("meter misread"))
//!     .await?;
//!
//! // A supervisor approves it, which applies the stored snapshot:
//! if let MutationOutcome::Queued { request_id } = outcome {
//!     let supervisor = Actor::new(reviewer_id, Role::Supervisor, "unit-1");
//!     review.approve(request_id, &supervisor).await?;
//! }
//! ```
//!
//! # Modules
//!
//! - [`policy`] - Role → capability resolution (pure, total)
//! - [`types`] - Approval requests, actors, filters, config
//! - [`traits`] - Store and domain-mutator abstractions
//! - [`gate`] - The mutation gate
//! - [`review`] - The review service (list, approve, reject, retry apply)
//! - [`stores`] - Storage implementations (MemoryStore, PostgresStore)
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod gate;
pub mod policy;
pub mod registry;
pub mod review;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ApprovalError, Result};
pub use gate::{MutationGate, MutationOutcome};
pub use policy::{CapabilitySet, Role};
pub use registry::DomainRegistry;
pub use review::ReviewService;
pub use traits::{
    domain::{DomainMutator, DomainResult},
    store::ApprovalRequestStore,
};
pub use types::{
    Actor, ApprovalAction, ApprovalRequest, DecisionOutcome, DomainType, GateConfig,
    NewApprovalRequest, RequestFilter, RequestStatus,
};

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;
