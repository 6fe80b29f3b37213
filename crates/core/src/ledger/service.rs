//! Validation for recording ledger entries and changing their status.

use chrono::{DateTime, Utc};
use itinera_shared::types::money::{Currency, in_range};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::actor::{Actor, Role};
use crate::error::CommissionError;
use crate::ledger::types::{EntryKind, EntryStatus, LedgerEntry, LogisticStatus, NewLedgerEntry};

/// Stateless service for ledger entry rules.
pub struct LedgerService;

impl LedgerService {
    /// Derives a commission amount: `gross × rate / 100`, rounded to the
    /// currency precision.
    ///
    /// # Errors
    ///
    /// - `InvalidRate` if `rate` is outside 0..=100
    /// - `AmountOutOfRange` if the product overflows or the result does not
    ///   fit the ledger's amount columns
    pub fn compute_commission(
        gross_amount: Decimal,
        rate: Decimal,
        currency: Currency,
    ) -> Result<Decimal, CommissionError> {
        if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
            return Err(CommissionError::InvalidRate(rate));
        }
        let out_of_range = || CommissionError::AmountOutOfRange {
            item_id: Uuid::nil(),
            amount: gross_amount,
        };
        let amount = gross_amount
            .checked_mul(rate)
            .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
            .map(|amount| currency.round(amount))
            .ok_or_else(out_of_range)?;
        if in_range(amount) {
            Ok(amount)
        } else {
            Err(out_of_range())
        }
    }

    /// Validates a new entry and builds the open ledger entry to insert.
    ///
    /// Commission entries need a rate; their amount is derived from it unless
    /// given explicitly. Operator payments need a cost and default to
    /// logistic status `pending`. Fields that do not apply to the kind are
    /// cleared.
    ///
    /// # Errors
    ///
    /// - `InsufficientRole` unless the actor is finance or above
    /// - `EmptyField` for blank subject, reservation number or tour
    /// - `MissingField` for a missing rate or cost
    /// - `NegativeAmount` for negative gross, commission or cost amounts
    /// - `AmountOutOfRange` for amounts beyond the NUMERIC(19,4) columns
    /// - `InvalidRate` for a rate outside 0..=100
    pub fn prepare_record(
        input: NewLedgerEntry,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<LedgerEntry, CommissionError> {
        actor.require_role(Role::Finance)?;

        let id = Uuid::new_v4();

        for (field, value) in [
            ("subject_name", &input.subject_name),
            ("reservation_number", &input.reservation_number),
            ("tour_name", &input.tour_name),
        ] {
            if value.trim().is_empty() {
                return Err(CommissionError::EmptyField(field));
            }
        }

        let currency = input.currency;
        // Rounds first so a value just under the limit cannot round past it.
        let checked = |amount: Decimal| {
            if amount.is_sign_negative() && !amount.is_zero() {
                return Err(CommissionError::NegativeAmount {
                    item_id: id,
                    amount,
                });
            }
            let rounded = currency.round(amount);
            if in_range(rounded) {
                Ok(rounded)
            } else {
                Err(CommissionError::AmountOutOfRange {
                    item_id: id,
                    amount,
                })
            }
        };

        let gross_amount = checked(input.gross_amount)?;

        let (rate, computed_amount, cost_amount, logistic_status) = match input.kind {
            EntryKind::Commission => {
                let rate = input.rate.ok_or(CommissionError::MissingField {
                    field: "rate",
                    kind: EntryKind::Commission,
                })?;
                let derived = Self::compute_commission(gross_amount, rate, currency)?;
                let amount = match input.computed_amount {
                    Some(explicit) => checked(explicit)?,
                    None => derived,
                };
                (Some(rate), Some(amount), None, None)
            }
            EntryKind::OperatorPayment => {
                let cost = input.cost_amount.ok_or(CommissionError::MissingField {
                    field: "cost_amount",
                    kind: EntryKind::OperatorPayment,
                })?;
                let cost = checked(cost)?;
                let logistic = input.logistic_status.unwrap_or(LogisticStatus::Pending);
                (None, None, Some(cost), Some(logistic))
            }
        };

        Ok(LedgerEntry {
            id,
            kind: input.kind,
            subject_name: input.subject_name.trim().to_string(),
            reservation_id: input.reservation_id,
            reservation_number: input.reservation_number.trim().to_string(),
            tour_name: input.tour_name.trim().to_string(),
            client_name: input.client_name.trim().to_string(),
            pax: input.pax.max(0),
            sale_date: input.sale_date,
            operation_date: input.operation_date,
            gross_amount,
            currency,
            rate,
            computed_amount,
            cost_amount,
            status: EntryStatus::Pending,
            logistic_status,
            closing_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Checks that `entry` may move to `status`.
    ///
    /// Any status may follow any other while the entry is open; entries in
    /// an active closing are frozen.
    ///
    /// # Errors
    ///
    /// - `InsufficientRole` unless the actor is finance or above
    /// - `EntryClosed` if the entry belongs to an active closing
    pub fn validate_status_update(
        entry: &LedgerEntry,
        _status: EntryStatus,
        actor: &Actor,
    ) -> Result<(), CommissionError> {
        actor.require_role(Role::Finance)?;
        match entry.closing_id {
            Some(closing_id) => Err(CommissionError::EntryClosed {
                entry_id: entry.id,
                closing_id,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn finance() -> Actor {
        Actor::new(Uuid::new_v4(), "Lucia", Role::Finance)
    }

    fn commission_input() -> NewLedgerEntry {
        NewLedgerEntry {
            kind: EntryKind::Commission,
            subject_name: "Marta Diaz".to_string(),
            reservation_id: Uuid::new_v4(),
            reservation_number: "R-2040".to_string(),
            tour_name: "Iguazu Falls".to_string(),
            client_name: "K. Weber".to_string(),
            pax: 3,
            sale_date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            operation_date: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
            gross_amount: dec!(1234.50),
            currency: Currency::Usd,
            rate: Some(dec!(10)),
            computed_amount: None,
            cost_amount: Some(dec!(99)),
            logistic_status: None,
        }
    }

    #[rstest]
    #[case(dec!(1000), dec!(10), Currency::Usd, dec!(100.00))]
    #[case(dec!(1234.55), dec!(7.5), Currency::Eur, dec!(92.59))]
    #[case(dec!(100005), dec!(5), Currency::Clp, dec!(5000))]
    #[case(dec!(10), dec!(0), Currency::Usd, dec!(0))]
    fn test_compute_commission(
        #[case] gross: Decimal,
        #[case] rate: Decimal,
        #[case] currency: Currency,
        #[case] expected: Decimal,
    ) {
        assert_eq!(
            LedgerService::compute_commission(gross, rate, currency).unwrap(),
            expected
        );
    }

    #[test]
    fn test_compute_commission_rejects_rate_out_of_range() {
        assert!(matches!(
            LedgerService::compute_commission(dec!(100), dec!(100.01), Currency::Usd),
            Err(CommissionError::InvalidRate(_))
        ));
        assert!(matches!(
            LedgerService::compute_commission(dec!(100), dec!(-1), Currency::Usd),
            Err(CommissionError::InvalidRate(_))
        ));
    }

    #[test]
    fn test_compute_commission_overflow_is_an_error() {
        let err = LedgerService::compute_commission(Decimal::MAX, dec!(50), Currency::Usd).unwrap_err();
        assert!(matches!(err, CommissionError::AmountOutOfRange { .. }));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_prepare_rejects_amounts_beyond_column_range() {
        let mut input = commission_input();
        input.gross_amount = Decimal::MAX;
        let err = LedgerService::prepare_record(input, &finance(), Utc::now()).unwrap_err();
        assert!(matches!(err, CommissionError::AmountOutOfRange { .. }));
        assert!(err.item_id().is_some());

        let mut input = commission_input();
        input.computed_amount = Some(dec!(1000000000000000));
        assert!(matches!(
            LedgerService::prepare_record(input, &finance(), Utc::now()),
            Err(CommissionError::AmountOutOfRange { .. })
        ));

        let mut input = commission_input();
        input.kind = EntryKind::OperatorPayment;
        input.cost_amount = Some(dec!(999999999999999.9999));
        assert!(matches!(
            LedgerService::prepare_record(input, &finance(), Utc::now()),
            Err(CommissionError::AmountOutOfRange { .. })
        ));
    }

    #[test]
    fn test_prepare_commission_derives_amount() {
        let entry = LedgerService::prepare_record(commission_input(), &finance(), Utc::now()).unwrap();

        assert_eq!(entry.computed_amount, Some(dec!(123.45)));
        assert_eq!(entry.cost_amount, None);
        assert_eq!(entry.logistic_status, None);
        assert_eq!(entry.status, EntryStatus::Pending);
        assert!(entry.is_open());
    }

    #[test]
    fn test_prepare_commission_keeps_explicit_amount() {
        let mut input = commission_input();
        input.computed_amount = Some(dec!(80));

        let entry = LedgerService::prepare_record(input, &finance(), Utc::now()).unwrap();
        assert_eq!(entry.amount(), dec!(80));
    }

    #[test]
    fn test_prepare_operator_payment_defaults_logistic_status() {
        let mut input = commission_input();
        input.kind = EntryKind::OperatorPayment;
        input.cost_amount = Some(dec!(450.125));

        let entry = LedgerService::prepare_record(input, &finance(), Utc::now()).unwrap();
        assert_eq!(entry.cost_amount, Some(dec!(450.13)));
        assert_eq!(entry.rate, None);
        assert_eq!(entry.logistic_status, Some(LogisticStatus::Pending));
        assert!(!entry.can_close());
    }

    #[test]
    fn test_prepare_rejects_missing_fields() {
        let mut input = commission_input();
        input.rate = None;
        assert!(matches!(
            LedgerService::prepare_record(input, &finance(), Utc::now()),
            Err(CommissionError::MissingField { field: "rate", .. })
        ));

        let mut input = commission_input();
        input.kind = EntryKind::OperatorPayment;
        input.cost_amount = None;
        assert!(matches!(
            LedgerService::prepare_record(input, &finance(), Utc::now()),
            Err(CommissionError::MissingField {
                field: "cost_amount",
                ..
            })
        ));

        let mut input = commission_input();
        input.subject_name = "  ".to_string();
        assert!(matches!(
            LedgerService::prepare_record(input, &finance(), Utc::now()),
            Err(CommissionError::EmptyField("subject_name"))
        ));
    }

    #[test]
    fn test_prepare_rejects_negative_amounts() {
        let mut input = commission_input();
        input.gross_amount = dec!(-1);
        assert!(matches!(
            LedgerService::prepare_record(input, &finance(), Utc::now()),
            Err(CommissionError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn test_prepare_requires_finance_role() {
        let seller = Actor::new(Uuid::new_v4(), "Caro", Role::Salesperson);
        assert!(matches!(
            LedgerService::prepare_record(commission_input(), &seller, Utc::now()),
            Err(CommissionError::InsufficientRole { .. })
        ));
    }

    #[test]
    fn test_status_update_on_closed_entry_conflicts() {
        let mut entry = LedgerService::prepare_record(commission_input(), &finance(), Utc::now()).unwrap();
        assert!(LedgerService::validate_status_update(&entry, EntryStatus::Approved, &finance()).is_ok());

        let closing_id = Uuid::new_v4();
        entry.closing_id = Some(closing_id);
        let err = LedgerService::validate_status_update(&entry, EntryStatus::Paid, &finance()).unwrap_err();
        assert!(matches!(err, CommissionError::EntryClosed { closing_id: c, .. } if c == closing_id));
        assert_eq!(err.item_id(), Some(entry.id));
    }
}
