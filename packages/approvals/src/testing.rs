//! Testing utilities including mock implementations.
//!
//! These are useful for testing code that consumes the gate and review
//! service without wiring real domain modules or a database.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::Result;
use crate::traits::domain::{DomainMutator, DomainResult};
use crate::traits::store::ApprovalRequestStore;
use crate::types::{
    ApprovalRequest, DecisionOutcome, NewApprovalRequest, RequestFilter,
};

/// A call observed by [`MockDomain`], for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockDomainCall {
    Fetch(Uuid),
    Edit(Uuid),
    Delete(Uuid),
}

/// A mock domain module backed by an in-memory record map.
///
/// Supports failure injection so tests can exercise the
/// approved-but-unapplied path, and tracks every call for assertions.
#[derive(Default)]
pub struct MockDomain {
    records: Arc<RwLock<HashMap<Uuid, JsonValue>>>,
    fail_mutations: Arc<RwLock<bool>>,
    calls: Arc<RwLock<Vec<MockDomainCall>>>,
}

impl MockDomain {
    /// Create an empty mock domain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record.
    pub fn insert_record(&self, record_id: Uuid, state: JsonValue) {
        self.records.write().unwrap().insert(record_id, state);
    }

    /// Current state of a record, if present.
    pub fn record(&self, record_id: Uuid) -> Option<JsonValue> {
        self.records.read().unwrap().get(&record_id).cloned()
    }

    /// Make every subsequent mutation fail (fetches still succeed).
    pub fn set_failing(&self, failing: bool) {
        *self.fail_mutations.write().unwrap() = failing;
    }

    /// All calls observed so far.
    pub fn calls(&self) -> Vec<MockDomainCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of mutation calls (edits + deletes) observed so far.
    pub fn mutation_count(&self) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| !matches!(c, MockDomainCall::Fetch(_)))
            .count()
    }

    fn record_call(&self, call: MockDomainCall) {
        self.calls.write().unwrap().push(call);
    }

    fn check_failure(&self) -> DomainResult<()> {
        if *self.fail_mutations.read().unwrap() {
            Err("injected domain failure".into())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DomainMutator for MockDomain {
    async fn fetch_record(&self, record_id: Uuid) -> DomainResult<Option<JsonValue>> {
        self.record_call(MockDomainCall::Fetch(record_id));
        Ok(self.records.read().unwrap().get(&record_id).cloned())
    }

    async fn apply_edit(&self, record_id: Uuid, proposed_state: &JsonValue) -> DomainResult<()> {
        self.record_call(MockDomainCall::Edit(record_id));
        self.check_failure()?;
        self.records
            .write()
            .unwrap()
            .insert(record_id, proposed_state.clone());
        Ok(())
    }

    async fn apply_delete(&self, record_id: Uuid) -> DomainResult<()> {
        self.record_call(MockDomainCall::Delete(record_id));
        self.check_failure()?;
        self.records.write().unwrap().remove(&record_id);
        Ok(())
    }
}

/// Store wrapper that records which operations were invoked.
///
/// Used to assert negative properties, e.g. that a read-only actor's
/// attempt made no storage call at all.
pub struct RecordingStore<S> {
    inner: S,
    operations: Arc<RwLock<Vec<&'static str>>>,
}

impl<S> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            operations: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Names of store operations invoked so far, in order.
    pub fn operations(&self) -> Vec<&'static str> {
        self.operations.read().unwrap().clone()
    }

    fn record(&self, operation: &'static str) {
        self.operations.write().unwrap().push(operation);
    }
}

#[async_trait]
impl<S: ApprovalRequestStore> ApprovalRequestStore for RecordingStore<S> {
    async fn create(&self, new_request: NewApprovalRequest) -> Result<ApprovalRequest> {
        self.record("create");
        self.inner.create(new_request).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<ApprovalRequest>> {
        self.record("get");
        self.inner.get(id).await
    }

    async fn list(&self, filter: &RequestFilter) -> Result<Vec<ApprovalRequest>> {
        self.record("list");
        self.inner.list(filter).await
    }

    async fn decide(
        &self,
        id: Uuid,
        outcome: DecisionOutcome,
        decided_by: Uuid,
        reject_reason: Option<String>,
    ) -> Result<ApprovalRequest> {
        self.record("decide");
        self.inner.decide(id, outcome, decided_by, reject_reason).await
    }

    async fn mark_applied(&self, id: Uuid) -> Result<ApprovalRequest> {
        self.record("mark_applied");
        self.inner.mark_applied(id).await
    }
}

/// Store whose every operation fails with a `Storage` error.
///
/// For exercising the contract that a failed `create` means "request not
/// created" and that storage failures are surfaced, never swallowed.
#[derive(Default)]
pub struct FailingStore;

impl FailingStore {
    pub fn new() -> Self {
        Self
    }

    fn unavailable<T>() -> Result<T> {
        Err(crate::error::ApprovalError::Storage(
            "approval store unavailable".into(),
        ))
    }
}

#[async_trait]
impl ApprovalRequestStore for FailingStore {
    async fn create(&self, _new_request: NewApprovalRequest) -> Result<ApprovalRequest> {
        Self::unavailable()
    }

    async fn get(&self, _id: Uuid) -> Result<Option<ApprovalRequest>> {
        Self::unavailable()
    }

    async fn list(&self, _filter: &RequestFilter) -> Result<Vec<ApprovalRequest>> {
        Self::unavailable()
    }

    async fn decide(
        &self,
        _id: Uuid,
        _outcome: DecisionOutcome,
        _decided_by: Uuid,
        _reject_reason: Option<String>,
    ) -> Result<ApprovalRequest> {
        Self::unavailable()
    }

    async fn mark_applied(&self, _id: Uuid) -> Result<ApprovalRequest> {
        Self::unavailable()
    }
}
