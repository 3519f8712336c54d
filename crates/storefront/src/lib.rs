//! Rupite Greens storefront server.
//!
//! A JSON API for a small organic-produce shop: a built-in product
//! catalog, a single shared cart and favorites list persisted to a
//! snapshot file, an Econt courier integration for delivery pricing,
//! and a checkout flow that walks method selection, delivery details
//! and order submission.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod econt;
pub mod error;
pub mod middleware;
pub mod order;
pub mod routes;
pub mod session;
pub mod state;
