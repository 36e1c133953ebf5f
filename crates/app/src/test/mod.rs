//! Test context for service-level tests.

use std::sync::Arc;

use jiff::Timestamp;

use crate::{
    clock::{Clock, ManualClock},
    config::LedgerSettings,
    domain::{
        loyalty::StoreLoyaltyService, orders::StoreOrdersService,
        payments::StorePaymentsService, vouchers::StoreVouchersService,
    },
    store::{DocumentStore, MemoryStore},
};

pub(crate) mod helpers;

pub(crate) use db::TestDb;
pub(crate) use faulty::FaultyStore;

/// 2026-03-02T08:00:00Z, a weekday morning.
const START: i64 = 1_772_438_400;

pub(crate) struct TestContext {
    pub clock: Arc<ManualClock>,
    pub vouchers: StoreVouchersService,
    pub loyalty: StoreLoyaltyService,
    pub orders: StoreOrdersService,
    pub payments: StorePaymentsService,
}

impl TestContext {
    pub(crate) fn new() -> Self {
        Self::with_settings(LedgerSettings::default())
    }

    pub(crate) fn with_settings(settings: LedgerSettings) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), settings)
    }

    pub(crate) fn with_store(store: Arc<dyn DocumentStore>, settings: LedgerSettings) -> Self {
        let start = Timestamp::from_second(START).unwrap_or(Timestamp::UNIX_EPOCH);
        let clock = Arc::new(ManualClock::new(start));
        let shared_clock: Arc<dyn Clock> = clock.clone();

        let vouchers =
            StoreVouchersService::new(&store, Arc::clone(&shared_clock), settings.attempts());
        let loyalty = StoreLoyaltyService::new(&store, Arc::clone(&shared_clock), &settings);
        let orders = StoreOrdersService::new(
            &store,
            Arc::new(vouchers.clone()),
            Arc::clone(&shared_clock),
            settings.attempts(),
        );
        let payments = StorePaymentsService::new(
            &store,
            orders.clone(),
            Arc::new(loyalty.clone()),
            shared_clock,
            &settings,
        );

        Self {
            clock,
            vouchers,
            loyalty,
            orders,
            payments,
        }
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.clock.now()
    }
}
