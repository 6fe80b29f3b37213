//! Repository abstractions for data access.
//!
//! Repositories load and lock the state a core operation needs, call into
//! `itinera-core`, and persist the returned plan in the same transaction.

mod convert;

pub mod adjustment;
pub mod closing;
pub mod financial;
pub mod forecast;
pub mod ledger;
pub mod reversal;

pub use adjustment::{AdjustmentRepository, AppliedAdjustment, RejectedAdjustment};
pub use closing::{ClosingFilter, ClosingRepository};
pub use financial::FinancialRepository;
pub use forecast::ForecastRepository;
pub use ledger::LedgerRepository;
pub use reversal::ReversalRepository;
