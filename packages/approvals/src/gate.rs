//! The mutation gate: the single entry point for edits and deletes on
//! plant records.
//!
//! Every page module routes its edit/delete attempts through here instead
//! of deciding per-page whether the actor's role needs review. The gate
//! consults the policy resolver and either forwards the mutation to the
//! owning domain immediately or queues an approval request.
//!
//! Side effects are strictly scoped: a direct-path call touches only the
//! domain record, an approval-path call touches only the request store —
//! never both in one invocation. That separation is what makes the audit
//! trail meaningful: a pending or rejected request provably had zero
//! effect on the underlying record.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{ApprovalError, Result};
use crate::registry::DomainRegistry;
use crate::traits::domain::DomainResult;
use crate::traits::store::ApprovalRequestStore;
use crate::types::{Actor, ApprovalAction, DomainType, GateConfig, NewApprovalRequest};

/// What became of a gated mutation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOutcome {
    /// The actor's role allowed the mutation directly; the domain applied it.
    Applied,

    /// The mutation was recorded as a pending approval request. The record
    /// itself is untouched.
    Queued { request_id: Uuid },
}

/// The authorization checkpoint all edits and deletes pass through.
pub struct MutationGate {
    store: Arc<dyn ApprovalRequestStore>,
    domains: Arc<DomainRegistry>,
    config: GateConfig,
}

impl MutationGate {
    pub fn new(store: Arc<dyn ApprovalRequestStore>, domains: Arc<DomainRegistry>) -> Self {
        Self::with_config(store, domains, GateConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn ApprovalRequestStore>,
        domains: Arc<DomainRegistry>,
        config: GateConfig,
    ) -> Self {
        Self {
            store,
            domains,
            config,
        }
    }

    /// Attempt an edit on a domain record.
    ///
    /// Depending on the actor's role the proposed state is either applied
    /// immediately or queued as a pending approval request (in which case
    /// the record itself is untouched and a non-empty `reason` is
    /// required). Read-only roles and roles with no edit capability fail
    /// with `Forbidden` before anything is read or written.
    #[instrument(skip(self, proposed_state, reason), fields(role = %actor.role))]
    pub async fn request_edit(
        &self,
        actor: &Actor,
        domain_type: DomainType,
        record_id: Uuid,
        plant_scope: &str,
        proposed_state: JsonValue,
        reason: Option<&str>,
    ) -> Result<MutationOutcome> {
        let caps = actor.capabilities();

        if caps.is_read_only {
            return Err(self.forbidden(actor, ApprovalAction::Edit, domain_type));
        }

        if caps.can_edit_direct {
            let mutator = self.domains.get(domain_type)?;
            self.domain_call(domain_type, mutator.apply_edit(record_id, &proposed_state))
                .await?;
            debug!(%record_id, "edit applied directly");
            return Ok(MutationOutcome::Applied);
        }

        if caps.requires_approval_for_edit {
            let reason = require_reason(reason)?;
            let request = self
                .storage_call(self.store.create(NewApprovalRequest {
                    domain_type,
                    action: ApprovalAction::Edit,
                    target_record_id: record_id,
                    plant_scope: plant_scope.to_string(),
                    snapshot: proposed_state,
                    reason,
                    submitted_by: actor.user_id,
                }))
                .await?;
            debug!(%record_id, request_id = %request.id, "edit queued for approval");
            return Ok(MutationOutcome::Queued {
                request_id: request.id,
            });
        }

        Err(self.forbidden(actor, ApprovalAction::Edit, domain_type))
    }

    /// Attempt a delete on a domain record.
    ///
    /// Symmetric to [`request_edit`](Self::request_edit). On the approval
    /// path the record's current state is captured as the snapshot before
    /// anything happens, so a pending or rejected request retains enough
    /// information to reconstruct what would have been lost.
    #[instrument(skip(self, reason), fields(role = %actor.role))]
    pub async fn request_delete(
        &self,
        actor: &Actor,
        domain_type: DomainType,
        record_id: Uuid,
        plant_scope: &str,
        reason: Option<&str>,
    ) -> Result<MutationOutcome> {
        let caps = actor.capabilities();

        if caps.is_read_only {
            return Err(self.forbidden(actor, ApprovalAction::Delete, domain_type));
        }

        if caps.can_delete_direct {
            let mutator = self.domains.get(domain_type)?;
            self.domain_call(domain_type, mutator.apply_delete(record_id))
                .await?;
            debug!(%record_id, "delete applied directly");
            return Ok(MutationOutcome::Applied);
        }

        if caps.requires_approval_for_delete {
            let reason = require_reason(reason)?;

            let mutator = self.domains.get(domain_type)?;
            let snapshot = self
                .domain_call(domain_type, mutator.fetch_record(record_id))
                .await?
                .ok_or_else(|| {
                    ApprovalError::validation(format!("record {record_id} does not exist"))
                })?;

            let request = self
                .storage_call(self.store.create(NewApprovalRequest {
                    domain_type,
                    action: ApprovalAction::Delete,
                    target_record_id: record_id,
                    plant_scope: plant_scope.to_string(),
                    snapshot,
                    reason,
                    submitted_by: actor.user_id,
                }))
                .await?;
            debug!(%record_id, request_id = %request.id, "delete queued for approval");
            return Ok(MutationOutcome::Queued {
                request_id: request.id,
            });
        }

        Err(self.forbidden(actor, ApprovalAction::Delete, domain_type))
    }

    fn forbidden(
        &self,
        actor: &Actor,
        action: ApprovalAction,
        domain: DomainType,
    ) -> ApprovalError {
        ApprovalError::forbidden(actor.role, format!("{action} {domain} records"))
    }

    /// Run a store call under the configured storage timeout.
    async fn storage_call<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.config.storage_timeout, call)
            .await
            .map_err(|_| ApprovalError::Storage("approval store call timed out".into()))?
    }

    /// Run a domain call under the configured domain timeout.
    async fn domain_call<T>(
        &self,
        domain: DomainType,
        call: impl Future<Output = DomainResult<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.config.domain_timeout, call).await {
            Ok(result) => result.map_err(|source| ApprovalError::Domain { domain, source }),
            Err(_) => Err(ApprovalError::Domain {
                domain,
                source: "domain call timed out".into(),
            }),
        }
    }
}

/// Require a non-empty justification before anything is persisted.
fn require_reason(reason: Option<&str>) -> Result<String> {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApprovalError::validation("a reason is required for this change"))
}
