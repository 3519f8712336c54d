//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::econt::{EcontClient, EcontError};
use crate::session::SessionStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the catalog, the courier client, and the session
/// store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    econt: EcontClient,
    sessions: SessionStore,
}

impl AppState {
    /// Create a new application state, restoring the session snapshot from
    /// the configured path.
    ///
    /// # Errors
    ///
    /// Returns an error if the courier HTTP client cannot be constructed.
    pub fn new(config: StorefrontConfig) -> Result<Self, EcontError> {
        let catalog = Catalog::builtin();
        let econt = EcontClient::new(&config.econt)?;
        let sessions = SessionStore::load(config.snapshot_path.clone(), &catalog);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                econt,
                sessions,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the Econt courier client.
    #[must_use]
    pub fn econt(&self) -> &EcontClient {
        &self.inner.econt
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }
}
