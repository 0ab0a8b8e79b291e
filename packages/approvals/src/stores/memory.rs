//! In-memory storage implementation for testing and development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{ApprovalError, Result};
use crate::traits::store::ApprovalRequestStore;
use crate::types::{
    ApprovalRequest, DecisionOutcome, NewApprovalRequest, RequestFilter, RequestStatus,
};

/// In-memory approval request store.
///
/// Useful for tests and development. Not suitable for production as data is
/// lost on restart. The decide guard runs under the write lock, so the
/// pending→terminal transition is atomic here just as it is in the
/// PostgreSQL backend.
pub struct MemoryStore {
    requests: RwLock<HashMap<Uuid, ApprovalRequest>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            requests: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored requests.
    pub fn request_count(&self) -> usize {
        self.requests.read().unwrap().len()
    }

    /// Clear all stored requests.
    pub fn clear(&self) {
        self.requests.write().unwrap().clear();
    }
}

#[async_trait]
impl ApprovalRequestStore for MemoryStore {
    async fn create(&self, new_request: NewApprovalRequest) -> Result<ApprovalRequest> {
        let request = ApprovalRequest {
            // v7 ids keep insertion order, matching the database backend.
            id: Uuid::now_v7(),
            domain_type: new_request.domain_type,
            action: new_request.action,
            target_record_id: new_request.target_record_id,
            plant_scope: new_request.plant_scope,
            snapshot: new_request.snapshot,
            reason: new_request.reason,
            submitted_by: new_request.submitted_by,
            submitted_at: Utc::now(),
            status: RequestStatus::Pending,
            decided_by: None,
            decided_at: None,
            reject_reason: None,
            applied_at: None,
        };

        self.requests
            .write()
            .unwrap()
            .insert(request.id, request.clone());
        Ok(request)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ApprovalRequest>> {
        Ok(self.requests.read().unwrap().get(&id).cloned())
    }

    async fn list(&self, filter: &RequestFilter) -> Result<Vec<ApprovalRequest>> {
        let mut matching: Vec<ApprovalRequest> = self
            .requests
            .read()
            .unwrap()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(b.id.cmp(&a.id)));
        Ok(matching)
    }

    async fn decide(
        &self,
        id: Uuid,
        outcome: DecisionOutcome,
        decided_by: Uuid,
        reject_reason: Option<String>,
    ) -> Result<ApprovalRequest> {
        let reject_reason = validate_reject_reason(outcome, reject_reason)?;

        let mut requests = self.requests.write().unwrap();
        let request = requests
            .get_mut(&id)
            .ok_or(ApprovalError::RequestNotFound { id })?;

        if request.status != RequestStatus::Pending {
            return Err(ApprovalError::AlreadyDecided { id });
        }

        request.status = outcome.status();
        request.decided_by = Some(decided_by);
        request.decided_at = Some(Utc::now());
        request.reject_reason = reject_reason;
        Ok(request.clone())
    }

    async fn mark_applied(&self, id: Uuid) -> Result<ApprovalRequest> {
        let mut requests = self.requests.write().unwrap();
        let request = requests
            .get_mut(&id)
            .ok_or(ApprovalError::RequestNotFound { id })?;

        if request.status != RequestStatus::Approved || request.applied_at.is_some() {
            return Err(ApprovalError::AlreadyDecided { id });
        }

        request.applied_at = Some(Utc::now());
        Ok(request.clone())
    }
}

/// Shared decide-input rule: a rejection carries a non-empty reason, an
/// approval carries none.
pub(crate) fn validate_reject_reason(
    outcome: DecisionOutcome,
    reject_reason: Option<String>,
) -> Result<Option<String>> {
    match outcome {
        DecisionOutcome::Rejected => {
            let reason = reject_reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .ok_or_else(|| ApprovalError::validation("rejection requires a reason"))?;
            Ok(Some(reason))
        }
        DecisionOutcome::Approved => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApprovalAction, DomainType};
    use serde_json::json;

    fn new_request(plant: &str) -> NewApprovalRequest {
        NewApprovalRequest {
            domain_type: DomainType::FuelLog,
            action: ApprovalAction::Edit,
            target_record_id: Uuid::new_v4(),
            plant_scope: plant.to_string(),
            snapshot: json!({"liters": 310}),
            reason: "pump meter reset mid-shift".to_string(),
            submitted_by: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_pending() {
        let store = MemoryStore::new();
        let request = store.create(new_request("unit-1")).await.unwrap();

        assert_eq!(request.status, RequestStatus::Pending);
        assert!(request.decided_by.is_none());
        assert_eq!(store.request_count(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_roundtrip() {
        let store = MemoryStore::new();
        let snapshot = json!({"liters": 310, "pump": "P-3", "shift": {"no": 2}});
        let mut input = new_request("unit-1");
        input.snapshot = snapshot.clone();

        let created = store.create(input).await.unwrap();
        let fetched = store.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.snapshot, snapshot);
    }

    #[tokio::test]
    async fn test_decide_is_single_shot() {
        let store = MemoryStore::new();
        let request = store.create(new_request("unit-1")).await.unwrap();
        let reviewer = Uuid::new_v4();

        let decided = store
            .decide(request.id, DecisionOutcome::Approved, reviewer, None)
            .await
            .unwrap();
        assert_eq!(decided.status, RequestStatus::Approved);
        assert_eq!(decided.decided_by, Some(reviewer));

        // Second decision loses, first decision untouched.
        let second = store
            .decide(request.id, DecisionOutcome::Rejected, Uuid::new_v4(), Some("no".into()))
            .await;
        assert!(matches!(second, Err(ApprovalError::AlreadyDecided { .. })));

        let current = store.get(request.id).await.unwrap().unwrap();
        assert_eq!(current.status, RequestStatus::Approved);
        assert_eq!(current.decided_by, Some(reviewer));
        assert_eq!(current.decided_at, decided.decided_at);
    }

    #[tokio::test]
    async fn test_reject_requires_reason() {
        let store = MemoryStore::new();
        let request = store.create(new_request("unit-1")).await.unwrap();

        for missing in [None, Some("".to_string()), Some("   ".to_string())] {
            let result = store
                .decide(request.id, DecisionOutcome::Rejected, Uuid::new_v4(), missing)
                .await;
            assert!(matches!(result, Err(ApprovalError::Validation { .. })));
        }

        // The failed attempts must not have touched the request.
        let current = store.get(request.id).await.unwrap().unwrap();
        assert_eq!(current.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_approve_ignores_reject_reason() {
        let store = MemoryStore::new();
        let request = store.create(new_request("unit-1")).await.unwrap();

        let decided = store
            .decide(
                request.id,
                DecisionOutcome::Approved,
                Uuid::new_v4(),
                Some("stray reason".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(decided.reject_reason, None);
    }

    #[tokio::test]
    async fn test_list_newest_first_with_filter() {
        let store = MemoryStore::new();
        let first = store.create(new_request("unit-1")).await.unwrap();
        let second = store.create(new_request("unit-1")).await.unwrap();
        store.create(new_request("unit-2")).await.unwrap();

        let listed = store
            .list(&RequestFilter::new().for_plant("unit-1"))
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].submitted_at >= listed[1].submitted_at);
        assert_eq!(listed[1].id, first.id);
        assert_eq!(listed[0].id, second.id);
    }

    #[tokio::test]
    async fn test_mark_applied_guard() {
        let store = MemoryStore::new();
        let request = store.create(new_request("unit-1")).await.unwrap();

        // Not yet approved.
        assert!(matches!(
            store.mark_applied(request.id).await,
            Err(ApprovalError::AlreadyDecided { .. })
        ));

        store
            .decide(request.id, DecisionOutcome::Approved, Uuid::new_v4(), None)
            .await
            .unwrap();

        let applied = store.mark_applied(request.id).await.unwrap();
        assert!(applied.is_applied());

        // Applying twice loses the guard.
        assert!(matches!(
            store.mark_applied(request.id).await,
            Err(ApprovalError::AlreadyDecided { .. })
        ));
    }

    #[test]
    fn test_missing_request() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        tokio_test::block_on(async {
            assert!(store.get(id).await.unwrap().is_none());
            assert!(matches!(
                store
                    .decide(id, DecisionOutcome::Approved, Uuid::new_v4(), None)
                    .await,
                Err(ApprovalError::RequestNotFound { .. })
            ));
        });
    }
}
