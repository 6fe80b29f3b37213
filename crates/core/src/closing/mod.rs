//! Closing engine: grouping open ledger entries into invoiced batches.
//!
//! Per-entry state machine: `Open → Closed` through [`ClosingEngine::prepare`]
//! and back to `Open` only through the reversal module.

pub mod engine;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use engine::{ClosingEngine, ClosingPlan};
pub use types::{
    CloseRequest, Closing, ClosingDetail, ClosingDraft, ClosingLineItem, ClosingType,
    FinancialEntry, FinancialEntryKind, format_invoice_number,
};
