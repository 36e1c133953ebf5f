//! Orders Repository

use std::sync::Arc;

use crate::{
    domain::orders::records::{OrderRecord, OrderUuid},
    store::{Collection, DocumentStore, Documents, StoreError, Versioned},
};

#[derive(Debug, Clone)]
pub(crate) struct OrdersRepository {
    orders: Documents<OrderRecord>,
}

impl OrdersRepository {
    pub(crate) fn new(store: &Arc<dyn DocumentStore>) -> Self {
        Self {
            orders: Documents::new(Arc::clone(store), Collection::Orders),
        }
    }

    pub(crate) async fn get(&self, order: OrderUuid) -> Result<Versioned<OrderRecord>, StoreError> {
        self.orders.get(&order.to_string()).await
    }

    pub(crate) async fn insert(
        &self,
        order: OrderRecord,
    ) -> Result<Versioned<OrderRecord>, StoreError> {
        self.orders.insert(&order.uuid.to_string(), order).await
    }

    pub(crate) async fn replace(
        &self,
        expected_version: u64,
        order: OrderRecord,
    ) -> Result<Versioned<OrderRecord>, StoreError> {
        self.orders
            .replace(&order.uuid.to_string(), expected_version, order)
            .await
    }
}
