//! Favorites routes.

use axum::{
    Json,
    extract::{Path, State},
};
use rupite_greens_core::ProductId;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// The favorite product ids, in the order they were added.
#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<ProductId>,
}

/// Favorites after a toggle, plus the toggled product's new standing.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub favorites: Vec<ProductId>,
    pub favorited: bool,
}

/// Current favorites.
///
/// GET /api/favorites
pub async fn list(State(state): State<AppState>) -> Json<FavoritesResponse> {
    let session = state.sessions().lock().await;
    Json(FavoritesResponse {
        favorites: session.favorites.clone(),
    })
}

/// Toggle a product in or out of the favorites.
///
/// POST /api/favorites/{id}/toggle
pub async fn toggle(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ToggleResponse>> {
    if !state.catalog().contains(id) {
        return Err(AppError::NotFound(format!("product {id}")));
    }

    let response = {
        let mut session = state.sessions().lock().await;
        let favorited = session.toggle_favorite(id);
        ToggleResponse {
            favorites: session.favorites.clone(),
            favorited,
        }
    };
    state.sessions().persist().await;

    Ok(Json(response))
}
