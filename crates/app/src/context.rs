//! App Context

use std::sync::Arc;

use sqlx::migrate::MigrateError;
use thiserror::Error;

use crate::{
    clock::{Clock, SystemClock},
    config::LedgerSettings,
    database,
    domain::{
        loyalty::{LoyaltyService, StoreLoyaltyService},
        orders::{OrdersService, StoreOrdersService},
        payments::{PaymentsService, StorePaymentsService},
        vouchers::{StoreVouchersService, VouchersService},
    },
    store::{DocumentStore, MemoryStore, PgDocumentStore, StoreKind},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrations(#[source] MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub vouchers: Arc<dyn VouchersService>,
    pub loyalty: Arc<dyn LoyaltyService>,
    pub orders: Arc<dyn OrdersService>,
    pub payments: Arc<dyn PaymentsService>,
    pub store_kind: StoreKind,
}

impl AppContext {
    /// Wire every service over one document store and clock.
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        settings: &LedgerSettings,
    ) -> Self {
        let store_kind = store.kind();

        let vouchers: Arc<dyn VouchersService> = Arc::new(StoreVouchersService::new(
            &store,
            Arc::clone(&clock),
            settings.attempts(),
        ));

        let loyalty: Arc<dyn LoyaltyService> = Arc::new(StoreLoyaltyService::new(
            &store,
            Arc::clone(&clock),
            settings,
        ));

        let orders = StoreOrdersService::new(
            &store,
            Arc::clone(&vouchers),
            Arc::clone(&clock),
            settings.attempts(),
        );

        let payments = StorePaymentsService::new(
            &store,
            orders.clone(),
            Arc::clone(&loyalty),
            clock,
            settings,
        );

        Self {
            vouchers,
            loyalty,
            orders: Arc::new(orders),
            payments: Arc::new(payments),
            store_kind,
        }
    }

    /// Services over an in-process store and the system clock.
    #[must_use]
    pub fn in_memory(settings: &LedgerSettings) -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(SystemClock), settings)
    }

    /// Build application context from a database URL, applying pending
    /// migrations first.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or migrating
    /// fails.
    pub async fn from_database_url(
        url: &str,
        settings: &LedgerSettings,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrations)?;

        Ok(Self::new(
            Arc::new(PgDocumentStore::new(pool)),
            Arc::new(SystemClock),
            settings,
        ))
    }
}
