//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::order::OrderError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Checkout machine rejected the transition or its input.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Order form failed validation.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::Order(_) => StatusCode::BAD_REQUEST,
            // Sequencing conflicts are retryable once the client refreshes
            // its view of the checkout; input problems are plain 400s.
            Self::Checkout(err) => match err {
                CheckoutError::NotStarted
                | CheckoutError::WrongStep(_)
                | CheckoutError::PricingInFlight => StatusCode::CONFLICT,
                CheckoutError::EmptyCart
                | CheckoutError::MissingStreet
                | CheckoutError::UnknownCity(_)
                | CheckoutError::NoOffices(_)
                | CheckoutError::OfficeNotInCity { .. } => StatusCode::BAD_REQUEST,
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let body = match &self {
            Self::Internal(_) => json!({ "error": "Internal server error" }),
            Self::Checkout(err) => json!({ "error": err.to_string() }),
            Self::Order(OrderError::Invalid { missing }) => json!({
                "error": "validation",
                "missing": missing,
            }),
            Self::NotFound(_) | Self::BadRequest(_) => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rupite_greens_core::CityId;

    use super::*;
    use crate::checkout::CheckoutStep;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");

        let err = AppError::Checkout(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Checkout error: cart is empty");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_checkout_errors_split_into_conflict_and_bad_request() {
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::NotStarted)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::WrongStep(
                CheckoutStep::Method
            ))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::PricingInFlight)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::EmptyCart)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::UnknownCity(CityId::new(
                404
            )))),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_missing_fields() {
        let err = AppError::Order(OrderError::Invalid {
            missing: vec!["firstName", "termsAccepted"],
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "validation");
        assert_eq!(body["missing"], json!(["firstName", "termsAccepted"]));
    }

    #[tokio::test]
    async fn test_internal_body_is_generic() {
        let err = AppError::Internal("snapshot exploded".to_string());
        let response = err.into_response();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Internal server error");
    }
}
