//! HTTP middleware for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (outermost, capture errors with full request coverage)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (correlate logs, Sentry events, and responses)
//! 4. CORS (the storefront is consumed from a separate frontend origin)

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that tags every request with a request id.
///
/// An `x-request-id` supplied by an upstream proxy wins; otherwise a fresh
/// UUID v4 is minted. The id is recorded on the current tracing span,
/// attached to the Sentry scope, and echoed in the response headers.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request_id_from(request.headers());

    Span::current().record("request_id", &request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn request_id_from(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn test_router() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn(request_id_middleware))
    }

    #[tokio::test]
    async fn test_generated_id_is_a_uuid_and_echoed() {
        let response = test_router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let header = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(Uuid::parse_str(header).is_ok());
    }

    #[tokio::test]
    async fn test_upstream_id_wins() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(REQUEST_ID_HEADER, "edge-7f3a")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).unwrap(),
            "edge-7f3a"
        );
    }
}
