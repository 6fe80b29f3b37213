//! Property-based tests for AdjustmentService.

use chrono::{NaiveDate, Utc};
use itinera_shared::types::Currency;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::service::AdjustmentService;
use super::types::{AdjustmentStatus, AdjustmentType};
use crate::actor::{Actor, Role};
use crate::ledger::{EntryKind, EntryStatus, LedgerEntry};

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn entry_with(amount: Decimal) -> LedgerEntry {
    LedgerEntry {
        id: Uuid::new_v4(),
        kind: EntryKind::OperatorPayment,
        subject_name: "Andes Operator".to_string(),
        reservation_id: Uuid::new_v4(),
        reservation_number: "R-1".to_string(),
        tour_name: "Machu Picchu".to_string(),
        client_name: "P. Rossi".to_string(),
        pax: 1,
        sale_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        operation_date: NaiveDate::from_ymd_opt(2026, 1, 9).unwrap(),
        gross_amount: amount,
        currency: Currency::Pen,
        rate: None,
        computed_amount: None,
        cost_amount: Some(amount),
        status: EntryStatus::Approved,
        logistic_status: None,
        closing_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The stored delta always equals new minus original, and its sign
    /// matches the adjustment type.
    #[test]
    fn prop_adjustment_amount_matches_type(
        original in arb_amount(),
        new in arb_amount(),
    ) {
        prop_assume!(original != new);
        let entry = entry_with(original);
        let seller = Actor::new(Uuid::new_v4(), "S", Role::Salesperson);

        let request = AdjustmentService::propose(&entry, new, "recount", &seller, Utc::now()).unwrap();

        prop_assert_eq!(request.adjustment_amount, new - original);
        match request.adjustment_type {
            AdjustmentType::Increase => prop_assert!(request.adjustment_amount > Decimal::ZERO),
            AdjustmentType::Reduction => prop_assert!(request.adjustment_amount < Decimal::ZERO),
            AdjustmentType::Removal => prop_assert!(request.new_amount.is_zero()),
        }
    }

    /// Approval writes exactly the requested amount; rejection writes nothing.
    #[test]
    fn prop_only_approval_changes_live_amount(
        original in arb_amount(),
        new in arb_amount(),
        approve in any::<bool>(),
    ) {
        prop_assume!(original != new);
        let entry = entry_with(original);
        let seller = Actor::new(Uuid::new_v4(), "S", Role::Salesperson);
        let admin = Actor::new(Uuid::new_v4(), "A", Role::Admin);
        let request = AdjustmentService::propose(&entry, new, "recount", &seller, Utc::now()).unwrap();

        if approve {
            let outcome = AdjustmentService::approve(&request, &entry, None, &admin, Utc::now()).unwrap();
            prop_assert_eq!(outcome.entry.amount(), new);
            prop_assert_eq!(outcome.request.status, AdjustmentStatus::Approved);
        } else {
            let outcome = AdjustmentService::reject(&request, "no", &admin, Utc::now()).unwrap();
            prop_assert_eq!(entry.amount(), original);
            prop_assert_eq!(outcome.request.status, AdjustmentStatus::Rejected);
        }
    }
}
