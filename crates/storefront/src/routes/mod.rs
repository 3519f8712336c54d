//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check
//!
//! # Products
//! GET  /api/products                - Listing with search, filter, sort
//! GET  /api/products/{id}           - Product detail
//!
//! # Cart
//! GET    /api/cart                  - Cart with joined products and totals
//! POST   /api/cart/items            - Add one unit of a product
//! PUT    /api/cart/items/{id}       - Set a line's quantity
//! DELETE /api/cart/items/{id}       - Remove a line
//! DELETE /api/cart                  - Empty the cart
//!
//! # Favorites
//! GET  /api/favorites               - Favorite product ids
//! POST /api/favorites/{id}/toggle   - Toggle a favorite
//!
//! # Checkout
//! GET  /api/checkout                - Current state
//! POST /api/checkout/start          - Open an attempt
//! POST /api/checkout/method         - Choose door or office delivery
//! POST /api/checkout/back           - Back to method selection
//! POST /api/checkout/address        - Price door delivery
//! POST /api/checkout/office         - Price office delivery
//! POST /api/checkout/edit-delivery  - Reopen delivery from the summary
//! POST /api/checkout/submit         - Submit the order
//!
//! # Courier proxy
//! GET  /api/econt/cities            - City directory
//! GET  /api/econt/offices           - Office directory
//! POST /api/econt/calculate         - Shipment pricing
//! ```

pub mod cart;
pub mod checkout;
pub mod econt;
pub mod favorites;
pub mod products;

use axum::{
    Router,
    extract::State,
    http::{HeaderName, Method, StatusCode, header},
    routing::{get, post, put},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{REQUEST_ID_HEADER, request_id_middleware};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{id}",
            put(cart::set_quantity).delete(cart::remove_item),
        )
}

/// Create the favorites routes router.
pub fn favorites_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::list))
        .route("/{id}/toggle", post(favorites::toggle))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/start", post(checkout::start))
        .route("/method", post(checkout::choose_method))
        .route("/back", post(checkout::back))
        .route("/address", post(checkout::address))
        .route("/office", post(checkout::office))
        .route("/edit-delivery", post(checkout::edit_delivery))
        .route("/submit", post(checkout::submit))
}

/// Create the courier proxy router.
pub fn econt_routes() -> Router<AppState> {
    Router::new()
        .route("/cities", get(econt::cities))
        .route("/offices", get(econt::offices))
        .route("/calculate", post(econt::calculate))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/favorites", favorites_routes())
        .nest("/api/checkout", checkout_routes())
        .nest("/api/econt", econt_routes())
}

/// Assemble the application: health endpoints, API routes, and the
/// middleware stack short of the Sentry layers, which the binary adds
/// outermost.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                        request_id = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(build_cors())
        .with_state(state)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the session snapshot still serializes before returning OK.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let snapshot = state.sessions().lock().await.snapshot();
    match serde_json::to_vec(&snapshot) {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
