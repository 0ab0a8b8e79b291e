//! Integration tests for the review service: authorization, the guarded
//! decision, and the two-phase decide-then-apply sequence.

mod common;

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use approvals::{
    ApprovalError, ApprovalRequestStore, DecisionOutcome, DomainType, MutationOutcome,
    RequestFilter, RequestStatus, Role,
};

use common::{actor, actor_at, fixture, Fixture, OTHER_PLANT, PLANT};

/// Queue an operator edit and return its request id plus the untouched
/// record's id and initial state.
async fn queue_edit(fx: &Fixture, reason: &str) -> (Uuid, Uuid, serde_json::Value) {
    let (record_id, initial) = fx.seed_record();
    let outcome = fx
        .gate
        .request_edit(
            &actor(Role::Operator),
            DomainType::FuelLog,
            record_id,
            PLANT,
            json!({"pump": "P-3", "liters": 95, "shift": 2}),
            Some(reason),
        )
        .await
        .unwrap();

    match outcome {
        MutationOutcome::Queued { request_id } => (request_id, record_id, initial),
        other => panic!("expected queued outcome, got {other:?}"),
    }
}

// =============================================================================
// Approve
// =============================================================================

#[tokio::test]
async fn approve_applies_the_stored_snapshot() {
    let fx = fixture();
    let (request_id, record_id, _) = queue_edit(&fx, "correcting typo").await;
    let supervisor = actor(Role::Supervisor);

    let approved = fx.review.approve(request_id, &supervisor).await.unwrap();

    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.decided_by, Some(supervisor.user_id));
    assert!(approved.decided_at.is_some());
    assert!(approved.is_applied());

    // The deferred mutation ran with the snapshot, not the live input.
    assert_eq!(
        fx.fuel_logs.record(record_id),
        Some(json!({"pump": "P-3", "liters": 95, "shift": 2}))
    );
}

#[tokio::test]
async fn approve_of_a_delete_request_removes_the_record() {
    let fx = fixture();
    let (record_id, _) = fx.seed_record();

    let outcome = fx
        .gate
        .request_delete(
            &actor(Role::Operator),
            DomainType::FuelLog,
            record_id,
            PLANT,
            Some("duplicate entry"),
        )
        .await
        .unwrap();
    let MutationOutcome::Queued { request_id } = outcome else {
        panic!("expected queued outcome");
    };

    fx.review
        .approve(request_id, &actor(Role::Manager))
        .await
        .unwrap();
    assert_eq!(fx.fuel_logs.record(record_id), None);
}

#[tokio::test]
async fn non_reviewers_cannot_decide() {
    let fx = fixture();
    let (request_id, record_id, initial) = queue_edit(&fx, "typo").await;

    for role in [Role::Operator, Role::External, Role::Viewer] {
        let result = fx.review.approve(request_id, &actor(role)).await;
        assert!(
            matches!(result, Err(ApprovalError::Forbidden { .. })),
            "{role} decided a request"
        );
    }

    let request = fx.store.get(request_id).await.unwrap().unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(fx.fuel_logs.record(record_id), Some(initial));
}

#[tokio::test]
async fn plant_bound_reviewers_cannot_reach_other_plants() {
    let fx = fixture();
    let (request_id, _, _) = queue_edit(&fx, "typo").await;

    let result = fx
        .review
        .approve(request_id, &actor_at(Role::Supervisor, OTHER_PLANT))
        .await;
    assert!(matches!(result, Err(ApprovalError::Forbidden { .. })));

    // Cross-plant authority reaches it fine.
    fx.review
        .approve(request_id, &actor_at(Role::Avp, OTHER_PLANT))
        .await
        .unwrap();
}

// =============================================================================
// Reject
// =============================================================================

#[tokio::test]
async fn reject_requires_a_reason_and_never_mutates() {
    let fx = fixture();
    let (request_id, record_id, initial) = queue_edit(&fx, "typo").await;
    let supervisor = actor(Role::Supervisor);

    let missing = fx.review.reject(request_id, &supervisor, "  ").await;
    assert!(matches!(missing, Err(ApprovalError::Validation { .. })));

    let rejected = fx
        .review
        .reject(request_id, &supervisor, "insufficient justification")
        .await
        .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(
        rejected.reject_reason.as_deref(),
        Some("insufficient justification")
    );

    // The record was never touched at any point of the request's life.
    assert_eq!(fx.fuel_logs.record(record_id), Some(initial));
    assert_eq!(fx.fuel_logs.mutation_count(), 0);
}

// =============================================================================
// Exactly-once decision
// =============================================================================

#[tokio::test]
async fn second_decision_loses_and_changes_nothing() {
    let fx = fixture();
    let (request_id, _, _) = queue_edit(&fx, "typo").await;
    let supervisor = actor(Role::Supervisor);

    let approved = fx.review.approve(request_id, &supervisor).await.unwrap();

    let second = fx
        .review
        .reject(request_id, &actor(Role::Manager), "changed my mind")
        .await;
    assert!(matches!(second, Err(ApprovalError::AlreadyDecided { .. })));

    let current = fx.store.get(request_id).await.unwrap().unwrap();
    assert_eq!(current.status, RequestStatus::Approved);
    assert_eq!(current.decided_by, Some(supervisor.user_id));
    assert_eq!(current.decided_at, approved.decided_at);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_decisions_resolve_to_exactly_one_winner() {
    let fx = fixture();
    let store = fx.store.clone();

    for _ in 0..20 {
        let (request_id, _, _) = queue_edit(&fx, "race check").await;

        let approve_store = store.clone();
        let reject_store = store.clone();
        let approver = Uuid::new_v4();
        let rejecter = Uuid::new_v4();

        let approve = tokio::spawn(async move {
            approve_store
                .decide(request_id, DecisionOutcome::Approved, approver, None)
                .await
        });
        let reject = tokio::spawn(async move {
            reject_store
                .decide(
                    request_id,
                    DecisionOutcome::Rejected,
                    rejecter,
                    Some("beaten to it".to_string()),
                )
                .await
        });

        let results = [approve.await.unwrap(), reject.await.unwrap()];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        let already = results
            .iter()
            .filter(|r| matches!(r, Err(ApprovalError::AlreadyDecided { .. })))
            .count();

        assert_eq!(wins, 1, "exactly one decision must win");
        assert_eq!(already, 1, "the loser must see AlreadyDecided");

        let final_state = store.get(request_id).await.unwrap().unwrap();
        assert!(final_state.status.is_terminal());
    }
}

// =============================================================================
// Two-phase apply
// =============================================================================

#[tokio::test]
async fn failed_apply_leaves_request_approved_but_unapplied() {
    let fx = fixture();
    let (request_id, record_id, initial) = queue_edit(&fx, "typo").await;
    let supervisor = actor(Role::Supervisor);

    fx.fuel_logs.set_failing(true);
    let result = fx.review.approve(request_id, &supervisor).await;
    let err = result.unwrap_err();
    assert!(matches!(err, ApprovalError::Domain { .. }));
    assert!(err.is_retryable());

    // Decided, not applied, record untouched: distinguishable from success.
    let request = fx.store.get(request_id).await.unwrap().unwrap();
    assert_eq!(request.status, RequestStatus::Approved);
    assert!(request.is_pending_apply());
    assert_eq!(fx.fuel_logs.record(record_id), Some(initial));

    // Once the domain recovers, the apply is retried without re-deciding.
    fx.fuel_logs.set_failing(false);
    let applied = fx.review.retry_apply(request_id, &supervisor).await.unwrap();
    assert!(applied.is_applied());
    assert_eq!(applied.decided_by, Some(supervisor.user_id));
    assert_eq!(
        fx.fuel_logs.record(record_id),
        Some(json!({"pump": "P-3", "liters": 95, "shift": 2}))
    );
}

#[tokio::test]
async fn retry_apply_is_idempotent_once_applied() {
    let fx = fixture();
    let (request_id, _, _) = queue_edit(&fx, "typo").await;
    let supervisor = actor(Role::Supervisor);

    fx.review.approve(request_id, &supervisor).await.unwrap();
    let before = fx.fuel_logs.mutation_count();

    let retried = fx.review.retry_apply(request_id, &supervisor).await.unwrap();
    assert!(retried.is_applied());
    assert_eq!(fx.fuel_logs.mutation_count(), before);
}

#[tokio::test]
async fn retry_apply_refuses_undecided_or_rejected_requests() {
    let fx = fixture();
    let supervisor = actor(Role::Supervisor);

    let (pending_id, _, _) = queue_edit(&fx, "typo").await;
    let result = fx.review.retry_apply(pending_id, &supervisor).await;
    assert!(matches!(result, Err(ApprovalError::Validation { .. })));

    let (rejected_id, _, _) = queue_edit(&fx, "typo").await;
    fx.review
        .reject(rejected_id, &supervisor, "not needed")
        .await
        .unwrap();
    let result = fx.review.retry_apply(rejected_id, &supervisor).await;
    assert!(matches!(result, Err(ApprovalError::Validation { .. })));
    assert_eq!(fx.fuel_logs.mutation_count(), 0);
}

// =============================================================================
// Visibility
// =============================================================================

#[tokio::test]
async fn listing_respects_plant_authority() {
    let fx = fixture();
    let (request_id, _, _) = queue_edit(&fx, "typo").await;

    // In-plant reviewer sees it.
    let listed = fx
        .review
        .list_requests(&actor(Role::Supervisor), &RequestFilter::new())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, request_id);

    // A reviewer from another plant sees an empty queue, and asking for
    // the foreign plant explicitly is refused.
    let foreign = actor_at(Role::Supervisor, OTHER_PLANT);
    let listed = fx
        .review
        .list_requests(&foreign, &RequestFilter::new())
        .await
        .unwrap();
    assert!(listed.is_empty());

    let result = fx
        .review
        .list_requests(&foreign, &RequestFilter::new().for_plant(PLANT))
        .await;
    assert!(matches!(result, Err(ApprovalError::Forbidden { .. })));

    // Cross-plant authority sees everything.
    let listed = fx
        .review
        .list_requests(&actor_at(Role::Admin, OTHER_PLANT), &RequestFilter::new())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn submitters_see_only_their_own_requests() {
    let fx = fixture();
    let (record_id, _) = fx.seed_record();
    let operator = actor(Role::Operator);

    let outcome = fx
        .gate
        .request_edit(
            &operator,
            DomainType::FuelLog,
            record_id,
            PLANT,
            json!({"liters": 7}),
            Some("mine"),
        )
        .await
        .unwrap();
    let MutationOutcome::Queued { request_id } = outcome else {
        panic!("expected queued outcome");
    };
    // A second operator's request, invisible to the first.
    queue_edit(&fx, "someone else's").await;

    let listed = fx
        .review
        .list_requests(&operator, &RequestFilter::new())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, request_id);

    // get_request follows the same rule.
    let visible = fx.review.get_request(&operator, request_id).await.unwrap();
    assert!(visible.is_some());
    let other_operator = actor(Role::Operator);
    let hidden = fx
        .review
        .get_request(&other_operator, request_id)
        .await
        .unwrap();
    assert!(hidden.is_none());
}

#[tokio::test]
async fn deciding_a_missing_request_reports_not_found() {
    let fx = fixture();
    let result = fx
        .review
        .approve(Uuid::new_v4(), &actor(Role::Supervisor))
        .await;
    assert!(matches!(result, Err(ApprovalError::RequestNotFound { .. })));
}

#[tokio::test]
async fn storage_outage_surfaces_as_retryable_storage_error() {
    use approvals::testing::FailingStore;
    use approvals::{DomainRegistry, ReviewService};

    let domains = Arc::new(DomainRegistry::new());
    let review = ReviewService::new(Arc::new(FailingStore::new()), domains);

    let result = review
        .approve(Uuid::new_v4(), &actor(Role::Supervisor))
        .await;
    let err = result.unwrap_err();
    assert!(matches!(err, ApprovalError::Storage(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn decided_request_fields_survive_a_listing_round_trip() {
    let fx = fixture();
    let (request_id, _, _) = queue_edit(&fx, "typo").await;
    let supervisor = actor(Role::Supervisor);

    fx.review
        .reject(request_id, &supervisor, "out of window")
        .await
        .unwrap();

    let listed = fx
        .review
        .list_requests(
            &supervisor,
            &RequestFilter::new().with_status(RequestStatus::Rejected),
        )
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    let request = &listed[0];
    assert_eq!(request.id, request_id);
    assert_eq!(request.decided_by, Some(supervisor.user_id));
    assert_eq!(request.reject_reason.as_deref(), Some("out of window"));
    assert!(request.applied_at.is_none());
}

