//! Adjustment workflow.
//!
//! A proposed change to a ledger entry's amount waits for an administrator.
//! Approval writes the new amount to the live entry; rejection only records
//! the decision. Every decision leaves an append-only audit record.
//!
//! # Modules
//!
//! - `types` - Requests, decisions and their status enums
//! - `service` - Propose, approve and reject transitions

pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use service::{AdjustmentService, ApprovalOutcome, RejectionOutcome};
pub use types::{AdjustmentDecision, AdjustmentRequest, AdjustmentStatus, AdjustmentType};
