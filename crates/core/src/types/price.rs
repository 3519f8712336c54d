//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
///
/// Amounts are exact decimals and accumulate without rounding; rounding to
/// the cent happens only at display time via [`Price::rounded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., leva, not stotinki).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the store's working currency.
    #[must_use]
    pub const fn bgn(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::Bgn)
    }

    /// The amount rounded to two decimal places, half away from zero.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.rounded(), self.currency_code)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    #[default]
    Bgn,
    Eur,
}

impl CurrencyCode {
    /// The three-letter code as used on the wire.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Bgn => "BGN",
            Self::Eur => "EUR",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
