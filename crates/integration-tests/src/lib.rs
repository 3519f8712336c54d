//! Integration tests for Rupite Greens.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rupite-greens-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_api` - Product, cart, and favorites endpoints
//! - `checkout_flow` - The checkout flow driven over HTTP
//! - `courier_proxy` - Econt nomenclature and pricing endpoints
//!
//! # Approach
//!
//! Tests build the full router with `rupite_greens_storefront::routes::app`
//! and drive it in process via `tower::ServiceExt::oneshot`, so no running
//! server, database, or courier account is required. The courier base URL
//! points at an unroutable port, which lands every pricing call on the
//! offline fallback and keeps quotes deterministic. Each test gets a fresh
//! snapshot path under the system temp directory.
