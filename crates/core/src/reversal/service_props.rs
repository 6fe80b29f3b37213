//! Property-based tests for the close / undo / close round trip.

use chrono::{NaiveDate, Utc};
use itinera_shared::types::Currency;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use super::service::ReversalService;
use crate::actor::{Actor, Role};
use crate::closing::{CloseRequest, ClosingEngine, ClosingType};
use crate::error::CommissionError;
use crate::ledger::{EntryKind, EntryStatus, LedgerEntry};

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn commission(amount: Decimal) -> LedgerEntry {
    LedgerEntry {
        id: Uuid::new_v4(),
        kind: EntryKind::Commission,
        subject_name: "Seller".to_string(),
        reservation_id: Uuid::new_v4(),
        reservation_number: "R-5".to_string(),
        tour_name: "Tour".to_string(),
        client_name: "Client".to_string(),
        pax: 1,
        sale_date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
        operation_date: NaiveDate::from_ymd_opt(2026, 2, 9).unwrap(),
        gross_amount: amount,
        currency: Currency::Brl,
        rate: None,
        computed_amount: Some(amount),
        cost_amount: None,
        status: EntryStatus::Pending,
        logistic_status: None,
        closing_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// close, undo, close yields two distinct closings with sequential
    /// invoice numbers; undo releases exactly the closed set with live
    /// amounts unchanged, and a closed entry cannot be closed again.
    #[test]
    fn prop_close_undo_close_round_trip(
        amounts in prop::collection::vec(arb_amount(), 1..8),
        overrides in prop::collection::vec(prop::option::of(arb_amount()), 8),
    ) {
        let admin = Actor::new(Uuid::new_v4(), "Admin", Role::Admin);
        let mut entries: Vec<LedgerEntry> = amounts.iter().copied().map(commission).collect();
        let live_before: Vec<Decimal> = entries.iter().map(LedgerEntry::amount).collect();

        let request = CloseRequest {
            entry_ids: entries.iter().map(|e| e.id).collect(),
            closing_type: ClosingType::Salesperson,
            recipient_name: "Seller".to_string(),
            period_start: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
            currency: Currency::Brl,
            overrides: entries
                .iter()
                .zip(&overrides)
                .filter_map(|(e, o)| o.map(|amount| (e.id, amount)))
                .collect::<BTreeMap<_, _>>(),
        };

        let first = ClosingEngine::prepare(&request, &entries, &admin, Utc::now()).unwrap().seal(1);
        for entry in &mut entries {
            entry.closing_id = Some(first.closing.id);
        }

        let again = ClosingEngine::prepare(&request, &entries, &admin, Utc::now());
        let conflicted = matches!(again, Err(CommissionError::EntryClosed { .. }));
        prop_assert!(conflicted);

        let plan = ReversalService::plan(&first.closing, &first.items, "recount", &admin, Utc::now()).unwrap();
        let released: HashSet<Uuid> = plan.released_entry_ids.iter().copied().collect();
        let closed: HashSet<Uuid> = entries.iter().map(|e| e.id).collect();
        prop_assert_eq!(&released, &closed);

        for entry in &mut entries {
            if released.contains(&entry.id) {
                entry.closing_id = None;
            }
        }
        let live_after: Vec<Decimal> = entries.iter().map(LedgerEntry::amount).collect();
        prop_assert_eq!(&live_after, &live_before);

        let second = ClosingEngine::prepare(&request, &entries, &admin, Utc::now()).unwrap().seal(2);
        prop_assert_ne!(first.closing.id, second.closing.id);
        prop_assert_ne!(first.closing.invoice_label(), second.closing.invoice_label());
        prop_assert_eq!(second.closing.invoice_number, first.closing.invoice_number + 1);
        prop_assert_eq!(second.closing.total_amount, first.closing.total_amount);
    }
}
