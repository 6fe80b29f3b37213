//! Property-based tests for LedgerService.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::LedgerService;
use itinera_shared::types::Currency;

fn arb_currency() -> impl Strategy<Value = Currency> {
    prop::sample::select(Currency::ALL.to_vec())
}

/// Gross amounts from 0.00 to 1,000,000.00.
fn arb_gross() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Rates from 0.00 to 100.00 percent.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|v| Decimal::new(v, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A derived commission never exceeds the gross amount by more than
    /// rounding and is expressed in the currency's minor units.
    #[test]
    fn prop_commission_within_gross_and_rounded(
        gross in arb_gross(),
        rate in arb_rate(),
        currency in arb_currency(),
    ) {
        let amount = LedgerService::compute_commission(gross, rate, currency).unwrap();

        prop_assert!(amount >= Decimal::ZERO);
        prop_assert!(amount <= currency.round(gross));
        prop_assert_eq!(currency.round(amount), amount);
        prop_assert!(amount.scale() <= currency.minor_units());
    }

    /// Rates above 100 percent are always rejected.
    #[test]
    fn prop_rate_above_hundred_rejected(
        gross in arb_gross(),
        excess in 1i64..100_000i64,
    ) {
        let rate = Decimal::ONE_HUNDRED + Decimal::new(excess, 2);
        prop_assert!(LedgerService::compute_commission(gross, rate, Currency::Usd).is_err());
    }
}
