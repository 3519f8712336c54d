//! Closed enums for the catalog's categories and badges.
//!
//! The store is Bulgarian-facing, so the wire and display names are the
//! Bulgarian labels; the variants give them type-safe handles.

use serde::{Deserialize, Serialize};

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    #[serde(rename = "Краставички")]
    Gherkins,
    #[serde(rename = "Лютеници")]
    Lyutenitsa,
    #[serde(rename = "Смесени")]
    Mixed,
    #[serde(rename = "Зеленчуци")]
    Vegetables,
    #[serde(rename = "Чушки")]
    Peppers,
}

impl ProductCategory {
    /// The display label, as shown in listings and filters.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Gherkins => "Краставички",
            Self::Lyutenitsa => "Лютеници",
            Self::Mixed => "Смесени",
            Self::Vegetables => "Зеленчуци",
            Self::Peppers => "Чушки",
        }
    }

    /// All categories, in menu order.
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::Gherkins,
            Self::Lyutenitsa,
            Self::Mixed,
            Self::Vegetables,
            Self::Peppers,
        ]
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Краставички" => Ok(Self::Gherkins),
            "Лютеници" => Ok(Self::Lyutenitsa),
            "Смесени" => Ok(Self::Mixed),
            "Зеленчуци" => Ok(Self::Vegetables),
            "Чушки" => Ok(Self::Peppers),
            _ => Err(format!("invalid product category: {s}")),
        }
    }
}

/// Merchandising badge shown on a product card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductBadge {
    #[serde(rename = "Бестселър")]
    Bestseller,
    #[serde(rename = "Ново")]
    New,
    #[serde(rename = "Популярно")]
    Popular,
    #[serde(rename = "Премиум")]
    Premium,
}

impl ProductBadge {
    /// The display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Bestseller => "Бестселър",
            Self::New => "Ново",
            Self::Popular => "Популярно",
            Self::Premium => "Премиум",
        }
    }
}

impl std::fmt::Display for ProductBadge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde_uses_bulgarian_label() {
        let json = serde_json::to_string(&ProductCategory::Gherkins).unwrap();
        assert_eq!(json, "\"Краставички\"");
        let back: ProductCategory = serde_json::from_str("\"Лютеници\"").unwrap();
        assert_eq!(back, ProductCategory::Lyutenitsa);
    }

    #[test]
    fn test_category_from_str_matches_label() {
        for category in ProductCategory::all() {
            assert_eq!(category.label().parse::<ProductCategory>(), Ok(category));
        }
        assert!("Сирена".parse::<ProductCategory>().is_err());
    }

    #[test]
    fn test_badge_label() {
        assert_eq!(ProductBadge::Premium.to_string(), "Премиум");
    }
}
