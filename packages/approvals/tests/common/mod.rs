//! Shared fixtures for gate and review integration tests.

use std::sync::Arc;

use serde_json::json;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use approvals::testing::MockDomain;
use approvals::{
    Actor, DomainRegistry, DomainType, MemoryStore, MutationGate, ReviewService, Role,
};

pub const PLANT: &str = "unit-1";
pub const OTHER_PLANT: &str = "unit-2";

/// Everything a scenario needs: one store, one mock domain registered for
/// fuel logs, and the gate/review services wired over both.
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub fuel_logs: Arc<MockDomain>,
    pub gate: MutationGate,
    pub review: ReviewService,
}

pub fn fixture() -> Fixture {
    init_tracing();

    let store = Arc::new(MemoryStore::new());
    let fuel_logs = Arc::new(MockDomain::new());
    let domains = Arc::new(DomainRegistry::new().with(DomainType::FuelLog, fuel_logs.clone()));

    Fixture {
        gate: MutationGate::new(store.clone(), domains.clone()),
        review: ReviewService::new(store.clone(), domains),
        store,
        fuel_logs,
    }
}

impl Fixture {
    /// Seed a fuel log record, returning its id and initial state.
    pub fn seed_record(&self) -> (Uuid, JsonValue) {
        let record_id = Uuid::new_v4();
        let state = json!({"pump": "P-3", "liters": 120, "shift": 2});
        self.fuel_logs.insert_record(record_id, state.clone());
        (record_id, state)
    }
}

pub fn actor(role: Role) -> Actor {
    Actor::new(Uuid::new_v4(), role, PLANT)
}

pub fn actor_at(role: Role, plant: &str) -> Actor {
    Actor::new(Uuid::new_v4(), role, plant)
}

/// Respect RUST_LOG when debugging tests; safe to call repeatedly.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
