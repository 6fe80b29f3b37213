//! Property-based tests for ClosingEngine.
//!
//! - Totals equal the exact sum of line items
//! - Mixed-currency selections never close
//! - Operator payments whose tour has not concluded never close
//! - Overrides never touch the live entries

use chrono::{NaiveDate, Utc};
use itinera_shared::types::Currency;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::engine::ClosingEngine;
use super::types::{CloseRequest, ClosingType};
use crate::actor::{Actor, Role};
use crate::error::CommissionError;
use crate::ledger::{EntryKind, EntryStatus, LedgerEntry, LogisticStatus};

fn arb_uuid() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

/// Amounts with up to four decimals so rounding is exercised.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

fn arb_currency() -> impl Strategy<Value = Currency> {
    prop::sample::select(Currency::ALL.to_vec())
}

fn arb_logistic() -> impl Strategy<Value = LogisticStatus> {
    prop_oneof![
        Just(LogisticStatus::Pending),
        Just(LogisticStatus::Confirmed),
        Just(LogisticStatus::InProgress),
        Just(LogisticStatus::Completed),
        Just(LogisticStatus::NoShow),
        Just(LogisticStatus::Cancelled),
    ]
}

fn entry(
    id: Uuid,
    kind: EntryKind,
    amount: Decimal,
    currency: Currency,
    logistic_status: Option<LogisticStatus>,
) -> LedgerEntry {
    let (computed_amount, cost_amount) = match kind {
        EntryKind::Commission => (Some(amount), None),
        EntryKind::OperatorPayment => (None, Some(amount)),
    };
    LedgerEntry {
        id,
        kind,
        subject_name: "Subject".to_string(),
        reservation_id: Uuid::new_v4(),
        reservation_number: "R-1".to_string(),
        tour_name: "Tour".to_string(),
        client_name: "Client".to_string(),
        pax: 1,
        sale_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        operation_date: NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
        gross_amount: amount,
        currency,
        rate: None,
        computed_amount,
        cost_amount,
        status: EntryStatus::Approved,
        logistic_status,
        closing_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn close_request(
    closing_type: ClosingType,
    entries: &[LedgerEntry],
    currency: Currency,
    overrides: BTreeMap<Uuid, Decimal>,
) -> CloseRequest {
    CloseRequest {
        entry_ids: entries.iter().map(|e| e.id).collect(),
        closing_type,
        recipient_name: "Recipient".to_string(),
        period_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        period_end: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        currency,
        overrides,
    }
}

fn admin() -> Actor {
    Actor::new(Uuid::new_v4(), "Admin", Role::Admin)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// total_amount is the exact sum of line item amounts, item_count is
    /// their number, and every amount is in the currency precision.
    #[test]
    fn prop_total_equals_sum_of_items(
        rows in prop::collection::vec((arb_uuid(), arb_amount(), prop::option::of(arb_amount())), 1..20),
        currency in arb_currency(),
    ) {
        let entries: Vec<LedgerEntry> = rows
            .iter()
            .map(|(id, amount, _)| entry(*id, EntryKind::Commission, *amount, currency, None))
            .collect();
        prop_assume!(entries.iter().map(|e| e.id).collect::<std::collections::HashSet<_>>().len() == entries.len());
        let overrides: BTreeMap<Uuid, Decimal> = rows
            .iter()
            .filter_map(|(id, _, o)| o.map(|amount| (*id, amount)))
            .collect();

        let req = close_request(ClosingType::Agency, &entries, currency, overrides);
        let draft = ClosingEngine::prepare(&req, &entries, &admin(), Utc::now()).unwrap().seal(1);

        let sum: Decimal = draft.items.iter().map(|i| i.amount).sum();
        prop_assert_eq!(draft.closing.total_amount, sum);
        prop_assert_eq!(draft.financial_entry.amount, sum);
        prop_assert_eq!(usize::try_from(draft.closing.item_count).unwrap(), entries.len());
        for item in &draft.items {
            prop_assert_eq!(currency.round(item.amount), item.amount);
        }
    }

    /// Any selection spanning two or more currencies is rejected.
    #[test]
    fn prop_mixed_currency_always_rejected(
        rows in prop::collection::vec((arb_uuid(), arb_amount(), arb_currency()), 2..10),
        requested in arb_currency(),
    ) {
        let currencies: std::collections::HashSet<Currency> = rows.iter().map(|r| r.2).collect();
        prop_assume!(currencies.len() >= 2);

        let entries: Vec<LedgerEntry> = rows
            .iter()
            .map(|(id, amount, c)| entry(*id, EntryKind::Commission, *amount, *c, None))
            .collect();
        prop_assume!(entries.iter().map(|e| e.id).collect::<std::collections::HashSet<_>>().len() == entries.len());

        let req = close_request(ClosingType::Salesperson, &entries, requested, BTreeMap::new());
        let result = ClosingEngine::prepare(&req, &entries, &admin(), Utc::now());
        let is_mixed = matches!(result, Err(CommissionError::MixedCurrency { .. }));
        prop_assert!(is_mixed, "expected MixedCurrency, got {:?}", result);
    }

    /// A closing succeeds only if every operator tour has concluded.
    #[test]
    fn prop_unconcluded_tours_never_close(
        rows in prop::collection::vec((arb_uuid(), arb_amount(), arb_logistic()), 1..10),
    ) {
        let entries: Vec<LedgerEntry> = rows
            .iter()
            .map(|(id, amount, l)| entry(*id, EntryKind::OperatorPayment, *amount, Currency::Usd, Some(*l)))
            .collect();
        prop_assume!(entries.iter().map(|e| e.id).collect::<std::collections::HashSet<_>>().len() == entries.len());

        let req = close_request(ClosingType::Operator, &entries, Currency::Usd, BTreeMap::new());
        let result = ClosingEngine::prepare(&req, &entries, &admin(), Utc::now());

        let all_concluded = rows.iter().all(|(_, _, l)| l.is_concluded());
        match result {
            Ok(plan) => {
                prop_assert!(all_concluded);
                for item in plan.items() {
                    prop_assert!(item.logistic_status.is_some_and(|l| l.is_concluded()));
                }
            }
            Err(err) => {
                prop_assert!(!all_concluded);
                let is_not_closable = matches!(err, CommissionError::NotClosable { .. });
                prop_assert!(is_not_closable);
            }
        }
    }

    /// Override amounts land on line items only; each item keeps the live
    /// amount it replaced, and the live entries are unchanged.
    #[test]
    fn prop_overrides_never_touch_live_entries(
        rows in prop::collection::vec((arb_uuid(), arb_amount(), arb_amount()), 1..10),
    ) {
        let entries: Vec<LedgerEntry> = rows
            .iter()
            .map(|(id, amount, _)| entry(*id, EntryKind::Commission, *amount, Currency::Eur, None))
            .collect();
        prop_assume!(entries.iter().map(|e| e.id).collect::<std::collections::HashSet<_>>().len() == entries.len());
        let before = entries.clone();
        let overrides: BTreeMap<Uuid, Decimal> = rows.iter().map(|(id, _, o)| (*id, *o)).collect();

        let req = close_request(ClosingType::Agency, &entries, Currency::Eur, overrides);
        let plan = ClosingEngine::prepare(&req, &entries, &admin(), Utc::now()).unwrap();

        prop_assert_eq!(&entries, &before);
        for (item, live) in plan.items().iter().zip(&entries) {
            prop_assert_eq!(item.original_amount, Currency::Eur.round(live.amount()));
        }
    }
}
