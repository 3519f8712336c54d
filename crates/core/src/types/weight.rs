//! Net weight parsed from a product's display label.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A product weight, carried as the original display label (e.g. `"720г"`)
/// together with the gram value parsed out of it.
///
/// Parsing keeps digits and the decimal point and drops everything else, so
/// `"720г"` reads as 720 grams. Labels with no usable number fall back to
/// [`Weight::DEFAULT_GRAMS`] rather than failing; a missing weight must not
/// block delivery pricing.
///
/// Serializes as the bare label string and re-parses on deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Weight {
    label: String,
    grams: Decimal,
}

impl Weight {
    /// Grams assumed when a label carries no parseable number.
    pub const DEFAULT_GRAMS: u32 = 500;

    /// Parse a weight from its display label.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        let numeric: String = label
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let grams = numeric
            .parse::<Decimal>()
            .unwrap_or_else(|_| Decimal::from(Self::DEFAULT_GRAMS));
        Self {
            label: label.to_owned(),
            grams,
        }
    }

    /// The original display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The parsed weight in grams.
    #[must_use]
    pub const fn grams(&self) -> Decimal {
        self.grams
    }

    /// The parsed weight in kilograms, the unit delivery pricing works in.
    #[must_use]
    pub fn kilograms(&self) -> Decimal {
        self.grams / Decimal::from(1000)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

impl Serialize for Weight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

impl<'de> Deserialize<'de> for Weight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::parse(&label))
    }
}
