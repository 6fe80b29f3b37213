//! Domain error taxonomy for the commission workflow.
//!
//! Every variant falls into one of four caller-facing kinds (validation,
//! not found, conflict, permission) or is an internal failure. Variants that
//! concern a specific ledger entry, request or closing name it so the caller
//! can correct the batch and retry.

use chrono::NaiveDate;
use itinera_shared::types::Currency;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::actor::Role;
use crate::adjustment::AdjustmentStatus;
use crate::closing::ClosingType;
use crate::ledger::{EntryKind, LogisticStatus};

/// Caller-facing classification of a [`CommissionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input.
    Validation,
    /// Unknown identifier.
    NotFound,
    /// The target is sealed, already decided, or held by another operation.
    Conflict,
    /// The actor's role does not allow the operation.
    Permission,
    /// Storage or rendering failure.
    Internal,
}

/// Errors produced by ledger, adjustment, closing, reversal and forecast operations.
#[derive(Debug, Error)]
pub enum CommissionError {
    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------
    /// No entries were selected for a closing.
    #[error("At least one ledger entry must be selected")]
    EmptySelection,

    /// The same entry was selected twice.
    #[error("Ledger entry {0} was selected more than once")]
    DuplicateEntry(Uuid),

    /// The closing period ends before it starts.
    #[error("Period start {start} is after period end {end}")]
    InvalidPeriod {
        /// Period start.
        start: NaiveDate,
        /// Period end.
        end: NaiveDate,
    },

    /// The closing has no recipient.
    #[error("Recipient name is required")]
    RecipientRequired,

    /// A selected entry does not exist.
    #[error("Ledger entry {0} does not exist")]
    UnknownEntry(Uuid),

    /// The entry kind does not fit the closing type.
    #[error("Ledger entry {entry_id} is a {kind} entry and cannot go into a {closing_type} closing")]
    KindMismatch {
        /// Offending entry.
        entry_id: Uuid,
        /// The entry's kind.
        kind: EntryKind,
        /// The requested closing type.
        closing_type: ClosingType,
    },

    /// An operator payment whose tour has not concluded.
    #[error("Ledger entry {entry_id} cannot be closed while its tour is {}", logistic_label(*.logistic_status))]
    NotClosable {
        /// Offending entry.
        entry_id: Uuid,
        /// Current logistic status.
        logistic_status: Option<LogisticStatus>,
    },

    /// The entry is not denominated in the closing currency.
    #[error("Ledger entry {entry_id} is in {found}, closing currency is {expected}")]
    MixedCurrency {
        /// Offending entry.
        entry_id: Uuid,
        /// Closing currency.
        expected: Currency,
        /// Entry currency.
        found: Currency,
    },

    /// An amount override names an entry outside the batch.
    #[error("Override for ledger entry {0} does not match any selected entry")]
    OverrideOutsideBatch(Uuid),

    /// A negative amount was supplied.
    #[error("Amount {amount} for {item_id} must not be negative")]
    NegativeAmount {
        /// Entry or item the amount belongs to.
        item_id: Uuid,
        /// The rejected amount.
        amount: Decimal,
    },

    /// An amount that does not fit the ledger's NUMERIC(19,4) columns.
    #[error("Amount {amount} for {item_id} exceeds the supported range")]
    AmountOutOfRange {
        /// Entry or item the amount belongs to.
        item_id: Uuid,
        /// The rejected amount, or the operand that overflowed.
        amount: Decimal,
    },

    /// A mandatory reason was empty.
    #[error("A reason is required to {0}")]
    ReasonRequired(&'static str),

    /// An adjustment that would not change the amount.
    #[error("New amount {amount} for ledger entry {entry_id} equals the current amount")]
    UnchangedAmount {
        /// Target entry.
        entry_id: Uuid,
        /// Proposed amount.
        amount: Decimal,
    },

    /// A commission rate outside 0..=100.
    #[error("Commission rate {0} must be between 0 and 100")]
    InvalidRate(Decimal),

    /// A field required for the entry kind is missing.
    #[error("Field `{field}` is required for {kind} entries")]
    MissingField {
        /// Missing field.
        field: &'static str,
        /// Entry kind.
        kind: EntryKind,
    },

    /// A text field was empty.
    #[error("Field `{0}` must not be empty")]
    EmptyField(&'static str),

    /// The closing was already reversed.
    #[error("Closing {0} is not active")]
    ClosingInactive(Uuid),

    // ------------------------------------------------------------------
    // Not found
    // ------------------------------------------------------------------
    /// Ledger entry not found.
    #[error("Ledger entry {0} not found")]
    EntryNotFound(Uuid),

    /// Adjustment request not found.
    #[error("Adjustment request {0} not found")]
    AdjustmentNotFound(Uuid),

    /// Closing not found.
    #[error("Closing {0} not found")]
    ClosingNotFound(Uuid),

    // ------------------------------------------------------------------
    // Conflict
    // ------------------------------------------------------------------
    /// The entry is sealed in an active closing.
    #[error("Ledger entry {entry_id} belongs to active closing {closing_id}")]
    EntryClosed {
        /// Offending entry.
        entry_id: Uuid,
        /// Closing holding it.
        closing_id: Uuid,
    },

    /// The adjustment request was already decided.
    #[error("Adjustment request {request_id} is already {status}")]
    AdjustmentNotPending {
        /// The request.
        request_id: Uuid,
        /// Its current status.
        status: AdjustmentStatus,
    },

    // ------------------------------------------------------------------
    // Permission
    // ------------------------------------------------------------------
    /// Only administrators may perform this action.
    #[error("Only administrators may {action} (current role: {role})")]
    AdminRequired {
        /// Attempted action.
        action: &'static str,
        /// The actor's role.
        role: Role,
    },

    /// The actor's role is below the required one.
    #[error("Role {role} does not meet required role {required}")]
    InsufficientRole {
        /// The actor's role.
        role: Role,
        /// Required role.
        required: Role,
    },

    // ------------------------------------------------------------------
    // Internal
    // ------------------------------------------------------------------
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Invoice rendering error.
    #[error("Document error: {0}")]
    Document(String),

    /// Any other internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn logistic_label(status: Option<LogisticStatus>) -> &'static str {
    status.map_or("unknown", |s| s.as_str())
}

impl CommissionError {
    /// Returns the caller-facing classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptySelection
            | Self::DuplicateEntry(_)
            | Self::InvalidPeriod { .. }
            | Self::RecipientRequired
            | Self::UnknownEntry(_)
            | Self::KindMismatch { .. }
            | Self::NotClosable { .. }
            | Self::MixedCurrency { .. }
            | Self::OverrideOutsideBatch(_)
            | Self::NegativeAmount { .. }
            | Self::AmountOutOfRange { .. }
            | Self::ReasonRequired(_)
            | Self::UnchangedAmount { .. }
            | Self::InvalidRate(_)
            | Self::MissingField { .. }
            | Self::EmptyField(_)
            | Self::ClosingInactive(_) => ErrorKind::Validation,

            Self::EntryNotFound(_) | Self::AdjustmentNotFound(_) | Self::ClosingNotFound(_) => {
                ErrorKind::NotFound
            }

            Self::EntryClosed { .. } | Self::AdjustmentNotPending { .. } => ErrorKind::Conflict,

            Self::AdminRequired { .. } | Self::InsufficientRole { .. } => ErrorKind::Permission,

            Self::Database(_) | Self::Document(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::Permission => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptySelection => "EMPTY_SELECTION",
            Self::DuplicateEntry(_) => "DUPLICATE_ENTRY",
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
            Self::RecipientRequired => "RECIPIENT_REQUIRED",
            Self::UnknownEntry(_) => "UNKNOWN_ENTRY",
            Self::KindMismatch { .. } => "KIND_MISMATCH",
            Self::NotClosable { .. } => "NOT_CLOSABLE",
            Self::MixedCurrency { .. } => "MIXED_CURRENCY",
            Self::OverrideOutsideBatch(_) => "OVERRIDE_OUTSIDE_BATCH",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
            Self::ReasonRequired(_) => "REASON_REQUIRED",
            Self::UnchangedAmount { .. } => "UNCHANGED_AMOUNT",
            Self::InvalidRate(_) => "INVALID_RATE",
            Self::MissingField { .. } => "MISSING_FIELD",
            Self::EmptyField(_) => "EMPTY_FIELD",
            Self::ClosingInactive(_) => "CLOSING_INACTIVE",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::AdjustmentNotFound(_) => "ADJUSTMENT_NOT_FOUND",
            Self::ClosingNotFound(_) => "CLOSING_NOT_FOUND",
            Self::EntryClosed { .. } => "ENTRY_CLOSED",
            Self::AdjustmentNotPending { .. } => "ADJUSTMENT_NOT_PENDING",
            Self::AdminRequired { .. } => "ADMIN_REQUIRED",
            Self::InsufficientRole { .. } => "INSUFFICIENT_ROLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Document(_) => "DOCUMENT_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The entry, request or closing this error is about, if any.
    #[must_use]
    pub const fn item_id(&self) -> Option<Uuid> {
        match self {
            Self::DuplicateEntry(id)
            | Self::UnknownEntry(id)
            | Self::OverrideOutsideBatch(id)
            | Self::ClosingInactive(id)
            | Self::EntryNotFound(id)
            | Self::AdjustmentNotFound(id)
            | Self::ClosingNotFound(id)
            | Self::KindMismatch { entry_id: id, .. }
            | Self::NotClosable { entry_id: id, .. }
            | Self::MixedCurrency { entry_id: id, .. }
            | Self::UnchangedAmount { entry_id: id, .. }
            | Self::EntryClosed { entry_id: id, .. }
            | Self::NegativeAmount { item_id: id, .. }
            | Self::AmountOutOfRange { item_id: id, .. }
            | Self::AdjustmentNotPending { request_id: id, .. } => Some(*id),
            _ => None,
        }
    }
}
