//! Property-based tests for ForecastService.

use itinera_shared::types::Currency;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::ForecastService;
use super::types::ForecastBucket;

fn arb_bucket() -> impl Strategy<Value = ForecastBucket> {
    (
        prop::sample::select(Currency::ALL.to_vec()),
        (0i64..10_000_000i64).prop_map(|c| Decimal::new(c, 2)),
        1u64..50,
    )
        .prop_map(|(currency, amount, count)| ForecastBucket::new(currency, amount, count))
}

fn total(buckets: &[ForecastBucket], currency: Currency) -> (Decimal, u64) {
    buckets
        .iter()
        .filter(|b| b.currency == currency)
        .fold((Decimal::ZERO, 0), |(amount, count), b| (amount + b.amount, count + b.count))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Per currency: income and liabilities sum their buckets, and net is
    /// their difference.
    #[test]
    fn prop_net_is_income_minus_liabilities(
        income in prop::collection::vec(arb_bucket(), 0..20),
        liabilities in prop::collection::vec(arb_bucket(), 0..20),
    ) {
        let forecast = ForecastService::from_totals(income.clone(), liabilities.clone());

        for currency in Currency::ALL {
            let (income_amount, income_count) = total(&income, currency);
            let (liability_amount, liability_count) = total(&liabilities, currency);

            prop_assert_eq!(
                forecast.income(currency).map_or(Decimal::ZERO, |b| b.amount),
                income_amount
            );
            prop_assert_eq!(
                forecast.liability(currency).map_or(Decimal::ZERO, |b| b.amount),
                liability_amount
            );
            match forecast.net(currency) {
                Some(net) => {
                    prop_assert_eq!(net.amount, income_amount - liability_amount);
                    prop_assert_eq!(net.count, income_count + liability_count);
                }
                None => prop_assert_eq!(income_count + liability_count, 0),
            }
        }
    }

    /// Every list is strictly ordered by currency code.
    #[test]
    fn prop_buckets_sorted_and_unique(
        income in prop::collection::vec(arb_bucket(), 0..20),
        liabilities in prop::collection::vec(arb_bucket(), 0..20),
    ) {
        let forecast = ForecastService::from_totals(income, liabilities);

        for list in [
            &forecast.expected_income,
            &forecast.forecast_liabilities,
            &forecast.net_forecast,
        ] {
            let codes: Vec<&str> = list.iter().map(|b| b.currency.code()).collect();
            prop_assert!(codes.windows(2).all(|w| w[0] < w[1]), "unordered: {:?}", codes);
        }
    }
}
