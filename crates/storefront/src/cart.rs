//! Shopping cart aggregate.
//!
//! The cart is an ordered list of lines, unique by product id. Quantities
//! are `u32` and never zero: any operation that would leave a line at zero
//! or below removes the line instead. Totals are computed against the
//! catalog so the cart itself stores no prices.

use rupite_greens_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;

/// One cart line: a product reference and how many units of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Cart contents in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one unit of a product: an existing line grows by one, otherwise
    /// a new line is appended with quantity 1.
    pub fn add_item(&mut self, product_id: ProductId) {
        if let Some(line) = self.line_mut(product_id) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            self.lines.push(CartLine {
                product_id,
                quantity: 1,
            });
        }
    }

    /// Remove a line entirely. Absent lines are a no-op.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.product_id != product_id);
    }

    /// Replace a line's quantity. Zero or negative removes the line; a
    /// line that does not exist is never created here.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(product_id);
        } else if let Some(line) = self.line_mut(product_id) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Quantity of a product in the cart, 0 when absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines
            .iter()
            .find(|line| line.product_id == product_id)
            .map_or(0, |line| line.quantity)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of price times quantity across all lines, exact.
    #[must_use]
    pub fn merchandise_total(&self, catalog: &Catalog) -> Decimal {
        self.lines
            .iter()
            .filter_map(|line| {
                catalog
                    .get(line.product_id)
                    .map(|product| product.price.amount * Decimal::from(line.quantity))
            })
            .sum()
    }

    /// Total shipment weight in kilograms, the delivery pricing input.
    #[must_use]
    pub fn total_weight_kg(&self, catalog: &Catalog) -> Decimal {
        self.lines
            .iter()
            .filter_map(|line| {
                catalog
                    .get(line.product_id)
                    .map(|product| product.weight.kilograms() * Decimal::from(line.quantity))
            })
            .sum()
    }

    /// Drop lines whose product no longer exists in the catalog. Returns
    /// how many lines were dropped.
    pub fn retain_known(&mut self, catalog: &Catalog) -> usize {
        let before = self.lines.len();
        self.lines.retain(|line| catalog.contains(line.product_id));
        before - self.lines.len()
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }
}
