//! Reversal handler: admin-only undo of a closing.
//!
//! The closing row stays for audit with `is_active = false`; its entries
//! become open again with their live amounts untouched.

pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use service::ReversalService;
pub use types::{ReversalPlan, ReversalRecord};
