//! Cart routes.
//!
//! Every mutation responds with the full cart view so the frontend can
//! re-render without a follow-up fetch.

use axum::{
    Json,
    extract::{Path, State},
};
use rupite_greens_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::checkout::DeliveryQuote;
use crate::error::{AppError, Result};
use crate::routes::products::ProductView;
use crate::session::Session;
use crate::state::AppState;

/// One cart line joined with its product data.
#[derive(Debug, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub product: ProductView,
    pub quantity: u32,
}

/// The cart with joined product data and derived totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub item_count: u32,
    pub merchandise_total: Decimal,
    pub total_weight_kg: Decimal,
    pub delivery_fee: Decimal,
    pub final_total: Decimal,
    pub delivery_info: Option<DeliveryQuote>,
}

impl CartView {
    pub(crate) fn build(session: &Session, catalog: &Catalog) -> Self {
        let items = session
            .cart
            .lines()
            .iter()
            .filter_map(|line| {
                catalog.get(line.product_id).map(|product| CartLineView {
                    product: ProductView::from(product),
                    quantity: line.quantity,
                })
            })
            .collect();

        Self {
            items,
            item_count: session.cart.item_count(),
            merchandise_total: session.cart.merchandise_total(catalog),
            total_weight_kg: session.cart.total_weight_kg(catalog),
            delivery_fee: session.delivery_fee(),
            final_total: session.final_total(catalog),
            delivery_info: session.delivery.clone(),
        }
    }
}

/// Request to add one unit of a product.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
}

/// Request to set a line's quantity.
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

/// Current cart.
///
/// GET /api/cart
pub async fn show(State(state): State<AppState>) -> Json<CartView> {
    let session = state.sessions().lock().await;
    Json(CartView::build(&session, state.catalog()))
}

/// Add one unit of a product.
///
/// POST /api/cart/items
pub async fn add_item(
    State(state): State<AppState>,
    Json(payload): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    if !state.catalog().contains(payload.product_id) {
        return Err(AppError::NotFound(format!(
            "product {}",
            payload.product_id
        )));
    }

    let view = {
        let mut session = state.sessions().lock().await;
        session.cart.add_item(payload.product_id);
        session.sync_after_cart_change();
        CartView::build(&session, state.catalog())
    };
    state.sessions().persist().await;

    Ok(Json(view))
}

/// Set a line's quantity. Zero or less removes the line; a product not in
/// the cart is left alone, never added.
///
/// PUT /api/cart/items/{id}
pub async fn set_quantity(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(payload): Json<SetQuantityRequest>,
) -> Json<CartView> {
    let view = {
        let mut session = state.sessions().lock().await;
        session.cart.set_quantity(id, payload.quantity);
        session.sync_after_cart_change();
        CartView::build(&session, state.catalog())
    };
    state.sessions().persist().await;

    Json(view)
}

/// Remove a line entirely.
///
/// DELETE /api/cart/items/{id}
pub async fn remove_item(State(state): State<AppState>, Path(id): Path<ProductId>) -> Json<CartView> {
    let view = {
        let mut session = state.sessions().lock().await;
        session.cart.remove_item(id);
        session.sync_after_cart_change();
        CartView::build(&session, state.catalog())
    };
    state.sessions().persist().await;

    Json(view)
}

/// Empty the cart, discarding the delivery quote and any checkout attempt.
///
/// DELETE /api/cart
pub async fn clear(State(state): State<AppState>) -> Json<CartView> {
    let view = {
        let mut session = state.sessions().lock().await;
        session.clear_cart();
        CartView::build(&session, state.catalog())
    };
    state.sessions().persist().await;

    Json(view)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_view_joins_products_and_totals() {
        let catalog = Catalog::builtin();
        let mut session = Session::default();
        session.cart.add_item(ProductId::new(1));
        session.cart.add_item(ProductId::new(1));
        session.cart.add_item(ProductId::new(2));

        let view = CartView::build(&session, &catalog);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.merchandise_total, Decimal::new(3030, 2));
        assert_eq!(view.delivery_fee, Decimal::ZERO);
        assert_eq!(view.final_total, view.merchandise_total);
        assert!(view.delivery_info.is_none());
    }

    #[test]
    fn test_view_flattens_product_fields_into_lines() {
        let catalog = Catalog::builtin();
        let mut session = Session::default();
        session.cart.add_item(ProductId::new(2));

        let view = CartView::build(&session, &catalog);
        let json = serde_json::to_value(&view).unwrap();
        let line = &json["items"][0];

        assert_eq!(line["id"], 2);
        assert_eq!(line["name"], "Лютеница домашна");
        assert_eq!(line["price"], "12.50");
        assert_eq!(line["quantity"], 1);
        assert_eq!(json["totalWeightKg"], "0.55");
    }
}
