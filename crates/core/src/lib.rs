//! Rupite Greens Core - Shared types library.
//!
//! This crate provides common types used across the Rupite Greens components:
//! - `storefront` - Public-facing store and courier proxy
//! - `integration-tests` - End-to-end tests driving the storefront
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no async.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, weights, emails,
//!   and the closed catalog enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
