//! Money type with decimal precision and currency.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Largest magnitude a ledger amount may have: the NUMERIC(19,4) column limit.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x89E7_FFFF, 0x8AC7_2304, 0, false, 4);

/// Returns true if `amount` fits the ledger's amount columns.
#[must_use]
pub fn in_range(amount: Decimal) -> bool {
    amount.abs() <= MAX_AMOUNT
}

/// Represents a monetary amount with currency.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount in major units (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code (e.g., "USD", "BRL").
    pub currency: Currency,
}

/// ISO 4217 currency codes handled by the back office.
///
/// A ledger entry is always denominated in exactly one of these; no
/// cross-currency arithmetic happens anywhere in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// Brazilian Real
    Brl,
    /// Argentine Peso
    Ars,
    /// Chilean Peso
    Clp,
    /// Mexican Peso
    Mxn,
    /// Peruvian Sol
    Pen,
    /// Colombian Peso
    Cop,
    /// Uruguayan Peso
    Uyu,
    /// Pound Sterling
    Gbp,
}

impl Currency {
    /// All supported currencies, in code order.
    pub const ALL: [Self; 10] = [
        Self::Ars,
        Self::Brl,
        Self::Clp,
        Self::Cop,
        Self::Eur,
        Self::Gbp,
        Self::Mxn,
        Self::Pen,
        Self::Usd,
        Self::Uyu,
    ];

    /// Returns the 3-letter code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Brl => "BRL",
            Self::Ars => "ARS",
            Self::Clp => "CLP",
            Self::Mxn => "MXN",
            Self::Pen => "PEN",
            Self::Cop => "COP",
            Self::Uyu => "UYU",
            Self::Gbp => "GBP",
        }
    }

    /// Number of decimal places in the currency's minor unit.
    #[must_use]
    pub const fn minor_units(&self) -> u32 {
        match self {
            Self::Clp => 0,
            _ => 2,
        }
    }

    /// Rounds an amount to this currency's minor-unit precision.
    ///
    /// Midpoints round away from zero.
    #[must_use]
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.minor_units(), RoundingStrategy::MidpointAwayFromZero)
    }
}

impl Money {
    /// Creates a new Money instance.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Returns the amount rounded to the currency's minor unit.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self::new(self.currency.round(self.amount), self.currency)
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rounded = self.rounded();
        write!(
            f,
            "{:.prec$} {}",
            rounded.amount,
            self.currency,
            prec = self.currency.minor_units() as usize
        )
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "BRL" => Ok(Self::Brl),
            "ARS" => Ok(Self::Ars),
            "CLP" => Ok(Self::Clp),
            "MXN" => Ok(Self::Mxn),
            "PEN" => Ok(Self::Pen),
            "COP" => Ok(Self::Cop),
            "UYU" => Ok(Self::Uyu),
            "GBP" => Ok(Self::Gbp),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_money_new() {
        let amount = dec!(100.00);
        let money = Money::new(amount, Currency::Usd);
        assert_eq!(money.amount, amount);
        assert_eq!(money.currency, Currency::Usd);
    }

    #[test]
    fn test_max_amount_matches_column_limit() {
        assert_eq!(MAX_AMOUNT, dec!(999999999999999.9999));
        assert!(in_range(MAX_AMOUNT));
        assert!(in_range(-MAX_AMOUNT));
        assert!(!in_range(dec!(1000000000000000)));
        assert!(!in_range(Decimal::MAX));
    }

    #[test]
    fn test_currency_round_two_decimals() {
        assert_eq!(Currency::Usd.round(dec!(10.005)), dec!(10.01));
        assert_eq!(Currency::Usd.round(dec!(10.004)), dec!(10.00));
        assert_eq!(Currency::Eur.round(dec!(-3.125)), dec!(-3.13));
    }

    #[test]
    fn test_currency_round_zero_decimals() {
        assert_eq!(Currency::Clp.round(dec!(1500.5)), dec!(1501));
        assert_eq!(Currency::Clp.round(dec!(1500.49)), dec!(1500));
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(dec!(250), Currency::Usd).to_string(), "250.00 USD");
        assert_eq!(Money::new(dec!(12000), Currency::Clp).to_string(), "12000 CLP");
    }

    #[test]
    fn test_currency_display() {
        assert_eq!(Currency::Usd.to_string(), "USD");
        assert_eq!(Currency::Brl.to_string(), "BRL");
        assert_eq!(Currency::Ars.to_string(), "ARS");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("USD").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str("brl").unwrap(), Currency::Brl);
        assert_eq!(Currency::from_str(" clp ").unwrap(), Currency::Clp);

        assert!(Currency::from_str("XXX").is_err());
        assert!(Currency::from_str("").is_err());
    }

    #[test]
    fn test_all_codes_round_trip() {
        for currency in Currency::ALL {
            assert_eq!(Currency::from_str(currency.code()).unwrap(), currency);
        }
    }
}
