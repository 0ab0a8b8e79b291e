//! The approval review service: the human-facing decision point and the
//! bridge back to the domain layer.
//!
//! Approval is a two-phase operation against two systems of record: first
//! the request store marks the request decided (the guarded transition),
//! then the originating domain's mutation runs from the stored snapshot,
//! then the request is stamped applied. If the apply phase fails the
//! request stays in the distinguishable approved-but-unapplied state —
//! `status = approved, applied_at = None` — and [`ReviewService::retry_apply`]
//! re-runs only the apply phase, without re-deciding.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::error::{ApprovalError, Result};
use crate::registry::DomainRegistry;
use crate::traits::domain::DomainResult;
use crate::traits::store::ApprovalRequestStore;
use crate::types::{
    Actor, ApprovalAction, ApprovalRequest, DecisionOutcome, DomainType, GateConfig, RequestFilter,
};

/// Lists pending requests and applies reviewer decisions.
pub struct ReviewService {
    store: Arc<dyn ApprovalRequestStore>,
    domains: Arc<DomainRegistry>,
    config: GateConfig,
}

impl ReviewService {
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

    /// Approve a pending request and apply its deferred mutation.
    ///
    /// The decision and the mutation are separate steps: if `decide`
    /// fails (`AlreadyDecided`, `Storage`) nothing else happens; if the
    /// mutation fails afterwards the request remains approved-but-unapplied
    /// and the `Domain` error is surfaced so an operator can
    /// [`retry_apply`](Self::retry_apply).
    #[instrument(skip(self), fields(reviewer_role = %reviewer.role))]
    pub async fn approve(&self, request_id: Uuid, reviewer: &Actor) -> Result<ApprovalRequest> {
        let request = self.authorized_request(request_id, reviewer).await?;

        let decided = self
            .storage_call(self.store.decide(
                request.id,
                DecisionOutcome::Approved,
                reviewer.user_id,
                None,
            ))
            .await?;
        debug!(%request_id, "request approved, applying deferred mutation");

        self.apply_phase(decided).await
    }

    /// Reject a pending request. Requires a non-empty reason; the domain
    /// record is left exactly as it was, which submission-time side-effect
    /// scoping already guarantees.
    #[instrument(skip(self, reject_reason), fields(reviewer_role = %reviewer.role))]
    pub async fn reject(
        &self,
        request_id: Uuid,
        reviewer: &Actor,
        reject_reason: &str,
    ) -> Result<ApprovalRequest> {
        let request = self.authorized_request(request_id, reviewer).await?;

        let decided = self
            .storage_call(self.store.decide(
                request.id,
                DecisionOutcome::Rejected,
                reviewer.user_id,
                Some(reject_reason.to_string()),
            ))
            .await?;
        debug!(%request_id, "request rejected");
        Ok(decided)
    }

    /// Re-run the apply phase of an approved-but-unapplied request.
    ///
    /// Idempotent: an already-applied request is returned unchanged. A
    /// still-pending or rejected request is refused — retrying the apply is
    /// never a way to skip or reverse a decision.
    #[instrument(skip(self), fields(reviewer_role = %reviewer.role))]
    pub async fn retry_apply(&self, request_id: Uuid, reviewer: &Actor) -> Result<ApprovalRequest> {
        let request = self.authorized_request(request_id, reviewer).await?;

        if request.is_applied() {
            return Ok(request);
        }
        if !request.is_pending_apply() {
            return Err(ApprovalError::validation(format!(
                "request {request_id} is {} and has no mutation to apply",
                request.status
            )));
        }

        self.apply_phase(request).await
    }

    /// List requests visible to this actor, newest-first.
    ///
    /// Reviewers see requests within their plant authority (all plants for
    /// cross-plant roles); everyone else sees only their own submissions.
    pub async fn list_requests(
        &self,
        actor: &Actor,
        filter: &RequestFilter,
    ) -> Result<Vec<ApprovalRequest>> {
        let caps = actor.capabilities();

        if caps.can_review {
            let mut filter = filter.clone();
            if !caps.cross_plant {
                match &filter.plant_scope {
                    Some(plant) if plant != &actor.plant => {
                        return Err(ApprovalError::forbidden(
                            actor.role,
                            format!("list requests for plant {plant}"),
                        ));
                    }
                    _ => filter.plant_scope = Some(actor.plant.clone()),
                }
            }
            return self.storage_call(self.store.list(&filter)).await;
        }

        // Non-reviewers may only look at their own submissions.
        let mut filter = filter.clone();
        filter.submitted_by = Some(actor.user_id);
        self.storage_call(self.store.list(&filter)).await
    }

    /// Fetch a single request, subject to the same visibility rules as
    /// [`list_requests`](Self::list_requests).
    pub async fn get_request(&self, actor: &Actor, id: Uuid) -> Result<Option<ApprovalRequest>> {
        let Some(request) = self.storage_call(self.store.get(id)).await? else {
            return Ok(None);
        };

        let visible = actor.may_review_plant(&request.plant_scope)
            || request.submitted_by == actor.user_id;
        Ok(visible.then_some(request))
    }

    /// Load the request and verify the reviewer may decide it.
    async fn authorized_request(
        &self,
        request_id: Uuid,
        reviewer: &Actor,
    ) -> Result<ApprovalRequest> {
        let caps = reviewer.capabilities();
        if !caps.can_review {
            return Err(ApprovalError::forbidden(
                reviewer.role,
                "review approval requests",
            ));
        }

        let request = self
            .storage_call(self.store.get(request_id))
            .await?
            .ok_or(ApprovalError::RequestNotFound { id: request_id })?;

        if !caps.may_review_plant(&reviewer.plant, &request.plant_scope) {
            return Err(ApprovalError::forbidden(
                reviewer.role,
                format!("review requests for plant {}", request.plant_scope),
            ));
        }

        Ok(request)
    }

    /// Run the deferred mutation from the stored snapshot, then stamp the
    /// request applied.
    async fn apply_phase(&self, request: ApprovalRequest) -> Result<ApprovalRequest> {
        let mutator = self.domains.get(request.domain_type)?;

        let applied = match request.action {
            ApprovalAction::Edit => {
                self.domain_call(
                    request.domain_type,
                    mutator.apply_edit(request.target_record_id, &request.snapshot),
                )
                .await
            }
            ApprovalAction::Delete => {
                self.domain_call(
                    request.domain_type,
                    mutator.apply_delete(request.target_record_id),
                )
                .await
            }
        };

        if let Err(error) = applied {
            warn!(
                request_id = %request.id,
                domain = %request.domain_type,
                %error,
                "approved mutation failed to apply; request left approved-but-unapplied"
            );
            return Err(error);
        }

        // If this stamp fails the mutation has still run; a later retry
        // re-applies, which idempotent mutators tolerate.
        self.storage_call(self.store.mark_applied(request.id)).await
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
