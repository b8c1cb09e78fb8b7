//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::PrintersConfig;
use crate::db::{PgPrinterStore, PrinterStore};
use crate::services::PrinterService;
use crate::services::auth::{IdentityProvider, PgIdentityProvider};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Storage is held behind trait objects so the
/// same router runs against `PostgreSQL` or the in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PrintersConfig,
    printers: Arc<dyn PrinterStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Create application state from explicit stores.
    #[must_use]
    pub fn new(
        config: PrintersConfig,
        printers: Arc<dyn PrinterStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                printers,
                identity,
            }),
        }
    }

    /// Create application state backed by a `PostgreSQL` pool.
    #[must_use]
    pub fn postgres(config: PrintersConfig, pool: PgPool) -> Self {
        Self::new(
            config,
            Arc::new(PgPrinterStore::new(pool.clone())),
            Arc::new(PgIdentityProvider::new(pool)),
        )
    }

    /// Get the printer store.
    #[must_use]
    pub fn printers(&self) -> &dyn PrinterStore {
        self.inner.printers.as_ref()
    }

    /// Get the identity provider.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }

    /// A printer service bound to this state's stores and settings.
    #[must_use]
    pub fn printer_service(&self) -> PrinterService<'_> {
        PrinterService::new(
            self.printers(),
            self.identity(),
            self.inner.config.update_validation,
        )
    }
}
