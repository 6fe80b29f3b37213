//! `SeaORM` entity definitions.

pub mod prelude;

pub mod adjustment_decisions;
pub mod adjustment_requests;
pub mod closing_items;
pub mod closing_reversals;
pub mod closings;
pub mod financial_entries;
pub mod invoice_counters;
pub mod ledger_entries;
pub mod sea_orm_active_enums;
