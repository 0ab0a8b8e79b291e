//! End-to-end walkthrough: an operator's edit queues for approval, a
//! supervisor decides it, and the deferred mutation lands on the record.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use approvals::testing::MockDomain;
use approvals::{
    Actor, DomainRegistry, DomainType, MemoryStore, MutationGate, MutationOutcome, RequestFilter,
    ReviewService, Role,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let fuel_logs = Arc::new(MockDomain::new());
    let domains = Arc::new(DomainRegistry::new().with(DomainType::FuelLog, fuel_logs.clone()));

    let gate = MutationGate::new(store.clone(), domains.clone());
    let review = ReviewService::new(store, domains);

    // A fuel log line owned by the fuel-log domain.
    let record_id = Uuid::new_v4();
    fuel_logs.insert_record(record_id, json!({"pump": "P-3", "liters": 120}));

    // The operator's correction does not apply; it queues.
    let operator = Actor::new(Uuid::new_v4(), Role::Operator, "unit-1");
    let outcome = gate
        .request_edit(
            &operator,
            DomainType::FuelLog,
            record_id,
            "unit-1",
            json!({"pump": "P-3", "liters": 210}),
            Some("pump meter reset mid-shift"),
        )
        .await?;

    let MutationOutcome::Queued { request_id } = outcome else {
        unreachable!("operators always queue");
    };
    println!("queued request {request_id}");
    println!("record still reads: {:?}", fuel_logs.record(record_id));

    // The supervisor reviews the plant's queue and approves.
    let supervisor = Actor::new(Uuid::new_v4(), Role::Supervisor, "unit-1");
    let pending = review
        .list_requests(&supervisor, &RequestFilter::new())
        .await?;
    println!("pending for unit-1: {}", pending.len());

    let approved = review.approve(request_id, &supervisor).await?;
    println!(
        "request {} is now {} (applied: {})",
        approved.id,
        approved.status,
        approved.is_applied()
    );
    println!("record now reads: {:?}", fuel_logs.record(record_id));

    Ok(())
}
