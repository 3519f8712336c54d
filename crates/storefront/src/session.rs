//! The storefront session and its on-disk snapshot.
//!
//! One logical visitor session owns the cart, favorites, the priced
//! delivery choice, and the transient checkout attempt. It lives behind a
//! `tokio` mutex on [`SessionStore`]; critical sections are short and
//! never held across I/O or courier calls. After each mutation the caller
//! persists a JSON snapshot; a snapshot that cannot be read back resets to
//! an empty session rather than guessing at migrations.

use std::path::PathBuf;

use rupite_greens_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::checkout::{Checkout, CheckoutError, DeliveryQuote};

/// Snapshot schema version this build reads and writes.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The persisted slice of the session. Checkout attempts and catalog data
/// never land here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    pub cart: Cart,
    pub favorites: Vec<ProductId>,
    pub delivery_info: Option<DeliveryQuote>,
}

/// Everything one visitor session owns.
#[derive(Debug, Default)]
pub struct Session {
    pub cart: Cart,
    pub favorites: Vec<ProductId>,
    pub delivery: Option<DeliveryQuote>,
    pub checkout: Option<Checkout>,
}

impl Session {
    /// Restore from a parsed snapshot, dropping references to products the
    /// catalog no longer carries.
    fn from_snapshot(snapshot: Snapshot, catalog: &Catalog) -> Self {
        let mut cart = snapshot.cart;
        let dropped = cart.retain_known(catalog);
        if dropped > 0 {
            warn!(dropped, "Dropped cart lines for products missing from the catalog");
        }

        let mut favorites = snapshot.favorites;
        let before = favorites.len();
        favorites.retain(|id| catalog.contains(*id));
        let dropped = before - favorites.len();
        if dropped > 0 {
            warn!(dropped, "Dropped favorites for products missing from the catalog");
        }

        Self {
            cart,
            favorites,
            delivery: snapshot.delivery_info,
            checkout: None,
        }
    }

    /// The persisted slice of this session.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            cart: self.cart.clone(),
            favorites: self.favorites.clone(),
            delivery_info: self.delivery.clone(),
        }
    }

    /// Toggle a favorite, returning whether the product is now favorited.
    /// New favorites append, so listing order is insertion order.
    pub fn toggle_favorite(&mut self, product_id: ProductId) -> bool {
        if let Some(position) = self.favorites.iter().position(|id| *id == product_id) {
            self.favorites.remove(position);
            false
        } else {
            self.favorites.push(product_id);
            true
        }
    }

    /// Empty the cart and drop everything that depends on it: the stored
    /// quote and any live checkout attempt.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.delivery = None;
        self.checkout = None;
    }

    /// Re-establish cart-dependent invariants after a cart mutation: an
    /// emptied cart cannot keep a quote or a live attempt.
    pub fn sync_after_cart_change(&mut self) {
        if self.cart.is_empty() {
            self.delivery = None;
            self.checkout = None;
        }
    }

    /// Quote price, or zero when no delivery has been priced.
    #[must_use]
    pub fn delivery_fee(&self) -> Decimal {
        self.delivery
            .as_ref()
            .map_or(Decimal::ZERO, |quote| quote.price)
    }

    /// Merchandise total plus delivery fee.
    #[must_use]
    pub fn final_total(&self, catalog: &Catalog) -> Decimal {
        self.cart.merchandise_total(catalog) + self.delivery_fee()
    }

    /// Begin a fresh checkout attempt, discarding any previous attempt and
    /// stored quote.
    ///
    /// # Errors
    ///
    /// The machine is not enterable with an empty cart.
    pub fn start_checkout(&mut self) -> Result<(), CheckoutError> {
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        self.delivery = None;
        self.checkout = Some(Checkout::new());
        Ok(())
    }

    /// The live attempt.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotStarted`] when no attempt exists.
    pub fn checkout_mut(&mut self) -> Result<&mut Checkout, CheckoutError> {
        self.checkout.as_mut().ok_or(CheckoutError::NotStarted)
    }
}

// ====== Store ======

/// Owns the session behind an async mutex, plus the snapshot path.
#[derive(Debug)]
pub struct SessionStore {
    session: Mutex<Session>,
    path: PathBuf,
}

impl SessionStore {
    /// Load the snapshot at `path`, or start empty when the file is
    /// missing, unreadable, or from another schema version.
    #[must_use]
    pub fn load(path: PathBuf, catalog: &Catalog) -> Self {
        let session = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Snapshot>(&bytes) {
                Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION => {
                    debug!(path = %path.display(), "Restored session snapshot");
                    Session::from_snapshot(snapshot, catalog)
                }
                Ok(snapshot) => {
                    warn!(
                        version = snapshot.version,
                        "Snapshot schema version mismatch, starting empty"
                    );
                    Session::default()
                }
                Err(error) => {
                    warn!(%error, "Snapshot unreadable, starting empty");
                    Session::default()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Session::default(),
            Err(error) => {
                warn!(%error, "Snapshot file unreadable, starting empty");
                Session::default()
            }
        };

        Self {
            session: Mutex::new(session),
            path,
        }
    }

    /// Lock the session for a short mutation or read.
    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().await
    }

    /// Write the current snapshot to disk. Failures are logged and never
    /// propagate: losing a snapshot must not fail a request.
    pub async fn persist(&self) {
        let snapshot = self.session.lock().await.snapshot();

        let bytes = match serde_json::to_vec_pretty(&snapshot) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(%error, "Failed to serialize session snapshot");
                return;
            }
        };

        if let Err(error) = tokio::fs::write(&self.path, bytes).await {
            warn!(
                error = %error,
                path = %self.path.display(),
                "Failed to write session snapshot"
            );
        }
    }
}
