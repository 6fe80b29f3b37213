//! Commission and operator-payment ledger.
//!
//! - `types` - Ledger entry model and its status enums
//! - `filter` - List filters
//! - `service` - Validation for recording entries and changing their status

pub mod filter;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use filter::{DateType, LedgerFilter};
pub use service::LedgerService;
pub use types::{EntryKind, EntryStatus, LedgerEntry, LogisticStatus, NewLedgerEntry};
