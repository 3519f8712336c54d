//! Core types for Rupite Greens.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod email;
pub mod id;
pub mod price;
pub mod weight;

pub use category::{ProductBadge, ProductCategory};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use weight::Weight;
