//! Courier proxy routes.
//!
//! Thin pass-throughs over [`EcontClient`](crate::econt::EcontClient): the
//! client already folds upstream failures into the local directories and
//! tariff, so these handlers are infallible.

use axum::{
    Json,
    extract::{Query, State},
};
use rupite_greens_core::CityId;
use serde::Deserialize;

use crate::econt::types::{CalculateRequest, CalculateResponse, CitiesResponse, OfficesResponse};
use crate::state::AppState;

/// Query parameters for the city lookup.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitiesParams {
    pub country_code: Option<String>,
    pub name: Option<String>,
}

/// Query parameters for the office lookup.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficesParams {
    pub city_id: Option<i32>,
    pub country_code: Option<String>,
}

/// Cities for a country, optionally filtered by name.
///
/// GET /api/econt/cities?countryCode=&name=
pub async fn cities(
    State(state): State<AppState>,
    Query(params): Query<CitiesParams>,
) -> Json<CitiesResponse> {
    let country_code = params
        .country_code
        .as_deref()
        .unwrap_or(&state.config().econt.country_code);

    let cities = state
        .econt()
        .cities(country_code, params.name.as_deref())
        .await;

    Json(CitiesResponse { cities })
}

/// Offices in a city.
///
/// GET /api/econt/offices?cityId=&countryCode=
pub async fn offices(
    State(state): State<AppState>,
    Query(params): Query<OfficesParams>,
) -> Json<OfficesResponse> {
    let country_code = params
        .country_code
        .as_deref()
        .unwrap_or(&state.config().econt.country_code);

    let offices = state
        .econt()
        .offices(params.city_id.map(CityId::new), Some(country_code))
        .await;

    Json(OfficesResponse { offices })
}

/// Price a shipment.
///
/// POST /api/econt/calculate
pub async fn calculate(
    State(state): State<AppState>,
    Json(request): Json<CalculateRequest>,
) -> Json<CalculateResponse> {
    Json(state.econt().calculate(&request).await)
}
