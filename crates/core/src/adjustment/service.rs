//! Adjustment workflow transitions.
//!
//! Each function takes the current request/entry snapshot and the acting
//! user, validates the transition, and returns the rows to persist. The
//! caller is responsible for locking the entry and committing the outcome
//! in one transaction.

use chrono::{DateTime, Utc};
use itinera_shared::types::money::in_range;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::actor::{Actor, Role};
use crate::adjustment::types::{
    AdjustmentDecision, AdjustmentRequest, AdjustmentStatus, AdjustmentType,
};
use crate::error::CommissionError;
use crate::ledger::LedgerEntry;

/// Result of approving a request.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    /// The request, now approved.
    pub request: AdjustmentRequest,
    /// The live entry with the new amount applied.
    pub entry: LedgerEntry,
    /// Audit record to append.
    pub decision: AdjustmentDecision,
}

impl ApprovalOutcome {
    /// The amount written to the live entry.
    #[must_use]
    pub fn applied_amount(&self) -> Decimal {
        self.entry.amount()
    }
}

/// Result of rejecting a request.
#[derive(Debug, Clone)]
pub struct RejectionOutcome {
    /// The request, now rejected.
    pub request: AdjustmentRequest,
    /// Audit record to append.
    pub decision: AdjustmentDecision,
}

/// Stateless service for the adjustment workflow.
pub struct AdjustmentService;

impl AdjustmentService {
    /// Proposes a new amount for `entry`.
    ///
    /// The new amount is rounded to the entry currency precision before it
    /// is compared with the live amount.
    ///
    /// # Errors
    ///
    /// - `InsufficientRole` for viewers
    /// - `ReasonRequired` if `reason` is blank
    /// - `NegativeAmount` if `new_amount` is negative
    /// - `AmountOutOfRange` if `new_amount` does not fit the amount columns
    /// - `UnchangedAmount` if `new_amount` equals the live amount
    pub fn propose(
        entry: &LedgerEntry,
        new_amount: Decimal,
        reason: &str,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<AdjustmentRequest, CommissionError> {
        actor.require_role(Role::Salesperson)?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(CommissionError::ReasonRequired("propose an adjustment"));
        }
        if new_amount < Decimal::ZERO {
            return Err(CommissionError::NegativeAmount {
                item_id: entry.id,
                amount: new_amount,
            });
        }

        let rounded = entry.currency.round(new_amount);
        if !in_range(rounded) {
            return Err(CommissionError::AmountOutOfRange {
                item_id: entry.id,
                amount: new_amount,
            });
        }
        let new_amount = rounded;
        let original_amount = entry.amount();
        if new_amount == original_amount {
            return Err(CommissionError::UnchangedAmount {
                entry_id: entry.id,
                amount: new_amount,
            });
        }

        Ok(AdjustmentRequest {
            id: Uuid::new_v4(),
            entry_id: entry.id,
            item_type: entry.kind,
            original_amount,
            new_amount,
            adjustment_amount: new_amount - original_amount,
            adjustment_type: AdjustmentType::classify(original_amount, new_amount),
            currency: entry.currency,
            reason: reason.to_string(),
            requested_by: actor.user_id,
            requested_by_name: actor.name.clone(),
            status: AdjustmentStatus::Pending,
            created_at: now,
            decided_at: None,
            decided_by: None,
        })
    }

    /// Approves a pending request and applies its amount to the live entry.
    ///
    /// `entry` must be the current, locked state of the request's entry.
    ///
    /// # Errors
    ///
    /// - `AdminRequired` for non-admin actors
    /// - `AdjustmentNotPending` if the request was already decided
    /// - `EntryClosed` if the entry belongs to an active closing
    pub fn approve(
        request: &AdjustmentRequest,
        entry: &LedgerEntry,
        note: Option<String>,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<ApprovalOutcome, CommissionError> {
        actor.require_admin("approve adjustments")?;
        Self::ensure_pending(request)?;

        if let Some(closing_id) = entry.closing_id {
            return Err(CommissionError::EntryClosed {
                entry_id: entry.id,
                closing_id,
            });
        }

        let mut updated_entry = entry.clone();
        updated_entry.set_amount(request.new_amount);
        updated_entry.updated_at = now;

        let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

        Ok(ApprovalOutcome {
            request: Self::decided(request, AdjustmentStatus::Approved, actor, now),
            entry: updated_entry,
            decision: Self::decision(request, AdjustmentStatus::Approved, note, actor, now),
        })
    }

    /// Rejects a pending request. The ledger entry is not touched.
    ///
    /// # Errors
    ///
    /// - `ReasonRequired` if `reason` is blank
    /// - `AdminRequired` for non-admin actors
    /// - `AdjustmentNotPending` if the request was already decided
    pub fn reject(
        request: &AdjustmentRequest,
        reason: &str,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<RejectionOutcome, CommissionError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(CommissionError::ReasonRequired("reject an adjustment"));
        }
        actor.require_admin("reject adjustments")?;
        Self::ensure_pending(request)?;

        Ok(RejectionOutcome {
            request: Self::decided(request, AdjustmentStatus::Rejected, actor, now),
            decision: Self::decision(
                request,
                AdjustmentStatus::Rejected,
                Some(reason.to_string()),
                actor,
                now,
            ),
        })
    }

    fn ensure_pending(request: &AdjustmentRequest) -> Result<(), CommissionError> {
        if request.status.is_final() {
            return Err(CommissionError::AdjustmentNotPending {
                request_id: request.id,
                status: request.status,
            });
        }
        Ok(())
    }

    fn decided(
        request: &AdjustmentRequest,
        status: AdjustmentStatus,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> AdjustmentRequest {
        AdjustmentRequest {
            status,
            decided_at: Some(now),
            decided_by: Some(actor.user_id),
            ..request.clone()
        }
    }

    fn decision(
        request: &AdjustmentRequest,
        decision: AdjustmentStatus,
        reason: Option<String>,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> AdjustmentDecision {
        AdjustmentDecision {
            id: Uuid::new_v4(),
            request_id: request.id,
            decision,
            reason,
            decided_by: actor.user_id,
            decided_by_name: actor.name.clone(),
            decided_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{EntryKind, EntryStatus};
    use chrono::NaiveDate;
    use itinera_shared::types::Currency;
    use rust_decimal_macros::dec;

    fn admin() -> Actor {
        Actor::new(Uuid::new_v4(), "Ana Admin", Role::Admin)
    }

    fn seller() -> Actor {
        Actor::new(Uuid::new_v4(), "Sergio", Role::Salesperson)
    }

    fn commission(amount: Decimal) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::new_v4(),
            kind: EntryKind::Commission,
            subject_name: "Sergio".to_string(),
            reservation_id: Uuid::new_v4(),
            reservation_number: "R-77".to_string(),
            tour_name: "Salar de Uyuni".to_string(),
            client_name: "L. Chen".to_string(),
            pax: 2,
            sale_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            operation_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            gross_amount: dec!(1000),
            currency: Currency::Usd,
            rate: Some(dec!(10)),
            computed_amount: Some(amount),
            cost_amount: None,
            status: EntryStatus::Pending,
            logistic_status: None,
            closing_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_approve_applies_new_amount() {
        let entry = commission(dec!(100));
        let request =
            AdjustmentService::propose(&entry, dec!(80), "client dispute", &seller(), Utc::now())
                .unwrap();

        assert_eq!(request.original_amount, dec!(100));
        assert_eq!(request.adjustment_amount, dec!(-20));
        assert_eq!(request.adjustment_type, AdjustmentType::Reduction);
        assert_eq!(request.status, AdjustmentStatus::Pending);

        let outcome =
            AdjustmentService::approve(&request, &entry, None, &admin(), Utc::now()).unwrap();

        assert_eq!(outcome.applied_amount(), dec!(80));
        assert_eq!(outcome.entry.computed_amount, Some(dec!(80)));
        assert_eq!(outcome.request.status, AdjustmentStatus::Approved);
        assert_eq!(outcome.decision.decision, AdjustmentStatus::Approved);
        assert_eq!(outcome.decision.request_id, request.id);
    }

    #[test]
    fn test_reject_leaves_entry_untouched() {
        let entry = commission(dec!(100));
        let request =
            AdjustmentService::propose(&entry, dec!(80), "client dispute", &seller(), Utc::now())
                .unwrap();

        let outcome =
            AdjustmentService::reject(&request, "insufficient evidence", &admin(), Utc::now())
                .unwrap();

        assert_eq!(outcome.request.status, AdjustmentStatus::Rejected);
        assert_eq!(outcome.decision.reason.as_deref(), Some("insufficient evidence"));
        assert_eq!(entry.amount(), dec!(100));
    }

    #[test]
    fn test_propose_validation() {
        let entry = commission(dec!(100));

        assert!(matches!(
            AdjustmentService::propose(&entry, dec!(80), "   ", &seller(), Utc::now()),
            Err(CommissionError::ReasonRequired(_))
        ));
        assert!(matches!(
            AdjustmentService::propose(&entry, dec!(-5), "typo", &seller(), Utc::now()),
            Err(CommissionError::NegativeAmount { .. })
        ));
        assert!(matches!(
            AdjustmentService::propose(&entry, dec!(100.001), "same", &seller(), Utc::now()),
            Err(CommissionError::UnchangedAmount { .. })
        ));
        assert!(matches!(
            AdjustmentService::propose(&entry, Decimal::MAX, "typo", &seller(), Utc::now()),
            Err(CommissionError::AmountOutOfRange { item_id, .. }) if item_id == entry.id
        ));

        let viewer = Actor::new(Uuid::new_v4(), "Vic", Role::Viewer);
        assert!(matches!(
            AdjustmentService::propose(&entry, dec!(80), "typo", &viewer, Utc::now()),
            Err(CommissionError::InsufficientRole { .. })
        ));
    }

    #[test]
    fn test_propose_removal() {
        let entry = commission(dec!(100));
        let request =
            AdjustmentService::propose(&entry, dec!(0), "tour cancelled", &seller(), Utc::now())
                .unwrap();
        assert_eq!(request.adjustment_type, AdjustmentType::Removal);
    }

    #[test]
    fn test_approve_requires_admin() {
        let entry = commission(dec!(100));
        let request =
            AdjustmentService::propose(&entry, dec!(120), "upsell", &seller(), Utc::now()).unwrap();
        let finance = Actor::new(Uuid::new_v4(), "Fin", Role::Finance);

        assert!(matches!(
            AdjustmentService::approve(&request, &entry, None, &finance, Utc::now()),
            Err(CommissionError::AdminRequired { .. })
        ));
        assert!(matches!(
            AdjustmentService::reject(&request, "no", &finance, Utc::now()),
            Err(CommissionError::AdminRequired { .. })
        ));
    }

    #[test]
    fn test_approve_sealed_entry_conflicts() {
        let mut entry = commission(dec!(100));
        let request =
            AdjustmentService::propose(&entry, dec!(120), "upsell", &seller(), Utc::now()).unwrap();
        entry.closing_id = Some(Uuid::new_v4());

        let err = AdjustmentService::approve(&request, &entry, None, &admin(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, CommissionError::EntryClosed { .. }));
    }

    #[test]
    fn test_decided_request_cannot_be_decided_again() {
        let entry = commission(dec!(100));
        let request =
            AdjustmentService::propose(&entry, dec!(120), "upsell", &seller(), Utc::now()).unwrap();
        let approved = AdjustmentService::approve(&request, &entry, None, &admin(), Utc::now())
            .unwrap()
            .request;

        assert!(matches!(
            AdjustmentService::approve(&approved, &entry, None, &admin(), Utc::now()),
            Err(CommissionError::AdjustmentNotPending {
                status: AdjustmentStatus::Approved,
                ..
            })
        ));
        assert!(matches!(
            AdjustmentService::reject(&approved, "late", &admin(), Utc::now()),
            Err(CommissionError::AdjustmentNotPending { .. })
        ));
    }
}
