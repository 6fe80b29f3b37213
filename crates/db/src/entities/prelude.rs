//! Entity re-exports.

pub use super::adjustment_decisions::Entity as AdjustmentDecisions;
pub use super::adjustment_requests::Entity as AdjustmentRequests;
pub use super::closing_items::Entity as ClosingItems;
pub use super::closing_reversals::Entity as ClosingReversals;
pub use super::closings::Entity as Closings;
pub use super::financial_entries::Entity as FinancialEntries;
pub use super::invoice_counters::Entity as InvoiceCounters;
pub use super::ledger_entries::Entity as LedgerEntries;
