//! Data types for approval requests and their surroundings.

pub mod actor;
pub mod config;
pub mod domain;
pub mod request;

pub use actor::Actor;
pub use config::{GateConfig, RequestFilter};
pub use domain::DomainType;
pub use request::{
    ApprovalAction, ApprovalRequest, DecisionOutcome, NewApprovalRequest, RequestStatus,
};
