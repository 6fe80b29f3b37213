//! Core business logic for Itinera.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Every operation is a function of a state snapshot, an explicit [`Actor`] and
//! the caller's input; persistence layers load and lock the snapshot, call in
//! here, and commit the returned plan atomically.
//!
//! # Modules
//!
//! - `actor` - Caller identity and role checks
//! - `error` - Domain error taxonomy
//! - `ledger` - Commission and operator-payment ledger entries
//! - `adjustment` - Amount change requests and their approval
//! - `closing` - Grouping open entries into immutable invoices
//! - `reversal` - Admin-only undo of a closing
//! - `forecast` - Expected income/liability rollups by currency
//! - `invoice` - PDF rendering of a closing

pub mod actor;
pub mod adjustment;
pub mod closing;
pub mod error;
pub mod forecast;
pub mod invoice;
pub mod ledger;
pub mod reversal;

pub use actor::{Actor, Role};
pub use error::{CommissionError, ErrorKind};
