//! Core trait abstractions.

pub mod domain;
pub mod store;

pub use domain::{DomainMutator, DomainResult};
pub use store::ApprovalRequestStore;
