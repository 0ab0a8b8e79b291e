//! Typed errors for the approvals library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;
use uuid::Uuid;

use crate::policy::Role;
use crate::types::DomainType;

/// Errors that can occur while gating mutations or reviewing requests.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// Policy denies the action entirely. Never retryable; the UI should not
    /// have offered the action.
    #[error("{role} is not permitted to {operation}")]
    Forbidden { role: Role, operation: String },

    /// Caller-correctable input problem (missing reason, missing or
    /// malformed record).
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// The request already left `pending`. The caller lost a race and should
    /// refresh rather than retry the same decision.
    #[error("request {id} is already decided")]
    AlreadyDecided { id: Uuid },

    /// No approval request with this id exists.
    #[error("request not found: {id}")]
    RequestNotFound { id: Uuid },

    /// No mutator registered for the domain. A wiring error, not retryable.
    #[error("no domain mutator registered for {domain}")]
    DomainNotRegistered { domain: DomainType },

    /// The wrapped domain mutation failed (e.g. a concurrent edit conflict).
    /// Retryable; domain mutators must be idempotent-safe.
    #[error("domain mutation failed for {domain}: {source}")]
    Domain {
        domain: DomainType,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The approval request store failed or timed out. Retryable with
    /// backoff. A failed `create` means "request not created", never an
    /// ambiguous state.
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApprovalError {
    /// Whether the caller may retry the same call.
    ///
    /// `Domain` and `Storage` failures are transient; everything else either
    /// requires corrected input or will fail identically on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Domain { .. } | Self::Storage(_))
    }

    /// Build a `Storage` error from any foreign error.
    pub fn storage(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(source))
    }

    /// Build a `Validation` error from a message.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Build a `Forbidden` error naming the denied operation.
    pub fn forbidden(role: Role, operation: impl Into<String>) -> Self {
        Self::Forbidden {
            role,
            operation: operation.into(),
        }
    }
}

/// Result type alias for approval operations.
pub type Result<T> = std::result::Result<T, ApprovalError>;
