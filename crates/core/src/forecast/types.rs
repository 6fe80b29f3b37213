//! Forecast types.

use itinera_shared::types::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sum and count of entries in one currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastBucket {
    /// Currency of the bucket.
    pub currency: Currency,
    /// Sum of amounts.
    pub amount: Decimal,
    /// Number of entries.
    pub count: u64,
}

impl ForecastBucket {
    /// Creates a bucket.
    #[must_use]
    pub const fn new(currency: Currency, amount: Decimal, count: u64) -> Self {
        Self {
            currency,
            amount,
            count,
        }
    }
}

/// Expected income and liabilities from open entries.
///
/// Every list is ordered by currency code. A negative net amount is left
/// for the display layer to label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    /// Open commissions.
    pub expected_income: Vec<ForecastBucket>,
    /// Open operator payments.
    pub forecast_liabilities: Vec<ForecastBucket>,
    /// Income minus liabilities, for every currency in either list.
    pub net_forecast: Vec<ForecastBucket>,
}

impl Forecast {
    /// Income bucket for `currency`, if any.
    #[must_use]
    pub fn income(&self, currency: Currency) -> Option<&ForecastBucket> {
        self.expected_income.iter().find(|b| b.currency == currency)
    }

    /// Liability bucket for `currency`, if any.
    #[must_use]
    pub fn liability(&self, currency: Currency) -> Option<&ForecastBucket> {
        self.forecast_liabilities.iter().find(|b| b.currency == currency)
    }

    /// Net bucket for `currency`, if any.
    #[must_use]
    pub fn net(&self, currency: Currency) -> Option<&ForecastBucket> {
        self.net_forecast.iter().find(|b| b.currency == currency)
    }
}
