//! Product catalog routes.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rupite_greens_core::{ProductId, Weight};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogQuery, Product, SortKey};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Category filter value meaning "no filter".
const ALL_CATEGORIES: &str = "Всички";

/// Listing query parameters, as sent by the frontend.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    q: Option<String>,
    category: Option<String>,
    #[serde(default)]
    sort: SortKey,
}

impl ListingParams {
    /// Resolve the raw parameters into a catalog query. The category
    /// filter accepts the label of any real category; the "Всички"
    /// pseudo-category and an absent parameter both mean no filter.
    fn into_query(self) -> Result<CatalogQuery> {
        let category = match self.category.as_deref() {
            None | Some(ALL_CATEGORIES) => None,
            Some(raw) => Some(raw.parse().map_err(AppError::BadRequest)?),
        };

        Ok(CatalogQuery {
            search: self.q,
            category,
            sort: self.sort,
        })
    }
}

/// Product as rendered to the frontend.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub rating: f32,
    pub reviews: u32,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    pub in_stock: bool,
    pub stock_quantity: u32,
    pub description: String,
    pub ingredients: Vec<String>,
    pub weight: Weight,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price.amount,
            image: product.image.clone(),
            rating: product.rating,
            reviews: product.reviews,
            category: product.category.label().to_owned(),
            badge: product.badge.map(|badge| badge.label().to_owned()),
            in_stock: product.in_stock,
            stock_quantity: product.stock_quantity,
            description: product.description.clone(),
            ingredients: product.ingredients.clone(),
            weight: product.weight.clone(),
        }
    }
}

/// Response for the product listing.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductView>,
}

/// Product listing with search, category filter, and sort.
///
/// GET /api/products?q=&category=&sort=
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Json<ProductListResponse>> {
    let query = params.into_query()?;
    let products = state
        .catalog()
        .list(&query)
        .into_iter()
        .map(ProductView::from)
        .collect();

    Ok(Json(ProductListResponse { products }))
}

/// Single product by id.
///
/// GET /api/products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductView>> {
    let product = state
        .catalog()
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(ProductView::from(product)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_into_query_passes_real_categories() {
        let params = ListingParams {
            q: Some("туршия".to_owned()),
            category: Some("Зеленчуци".to_owned()),
            sort: SortKey::PriceLow,
        };
        let query = params.into_query().unwrap();
        assert_eq!(query.search.as_deref(), Some("туршия"));
        assert!(query.category.is_some());
    }

    #[test]
    fn test_into_query_treats_all_as_no_filter() {
        for category in [None, Some(ALL_CATEGORIES.to_owned())] {
            let params = ListingParams {
                q: None,
                category,
                sort: SortKey::default(),
            };
            assert!(params.into_query().unwrap().category.is_none());
        }
    }

    #[test]
    fn test_into_query_rejects_unknown_category() {
        let params = ListingParams {
            q: None,
            category: Some("Сирена".to_owned()),
            sort: SortKey::default(),
        };
        assert!(params.into_query().is_err());
    }

    #[test]
    fn test_view_serializes_wire_names() {
        let catalog = Catalog::builtin();
        let view = ProductView::from(catalog.get(ProductId::new(1)).unwrap());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "Класически краставички");
        assert_eq!(json["price"], "8.90");
        assert_eq!(json["category"], "Краставички");
        assert_eq!(json["badge"], "Бестселър");
        assert_eq!(json["inStock"], true);
        assert_eq!(json["stockQuantity"], 45);
        assert_eq!(json["weight"], "720г");
    }

    #[test]
    fn test_view_omits_absent_badge() {
        let catalog = Catalog::builtin();
        let view = ProductView::from(catalog.get(ProductId::new(4)).unwrap());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("badge").is_none());
    }
}
