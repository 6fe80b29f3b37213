//! Forecast aggregation.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::forecast::types::{Forecast, ForecastBucket};

/// Stateless forecast service.
pub struct ForecastService;

impl ForecastService {
    /// Builds a forecast from per-currency totals of open entries, as
    /// returned by a grouped database query.
    ///
    /// Buckets in the same currency are merged, every list is sorted by
    /// currency code, and the net list covers the union of currencies.
    #[must_use]
    pub fn from_totals(income: Vec<ForecastBucket>, liabilities: Vec<ForecastBucket>) -> Forecast {
        let expected_income = Self::merge(income);
        let forecast_liabilities = Self::merge(liabilities);

        let mut net: BTreeMap<&'static str, ForecastBucket> = BTreeMap::new();
        for bucket in &expected_income {
            let slot = net
                .entry(bucket.currency.code())
                .or_insert_with(|| ForecastBucket::new(bucket.currency, Decimal::ZERO, 0));
            slot.amount += bucket.amount;
            slot.count += bucket.count;
        }
        for bucket in &forecast_liabilities {
            let slot = net
                .entry(bucket.currency.code())
                .or_insert_with(|| ForecastBucket::new(bucket.currency, Decimal::ZERO, 0));
            slot.amount -= bucket.amount;
            slot.count += bucket.count;
        }

        Forecast {
            expected_income,
            forecast_liabilities,
            net_forecast: net.into_values().collect(),
        }
    }

    fn merge(buckets: Vec<ForecastBucket>) -> Vec<ForecastBucket> {
        let mut merged: BTreeMap<&'static str, ForecastBucket> = BTreeMap::new();
        for bucket in buckets {
            merged
                .entry(bucket.currency.code())
                .and_modify(|b| {
                    b.amount += bucket.amount;
                    b.count += bucket.count;
                })
                .or_insert(bucket);
        }
        merged.into_values().collect()
    }
}
