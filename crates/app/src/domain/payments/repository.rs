//! Payments Repository

use std::sync::Arc;

use crate::{
    domain::{
        payments::records::{PaymentRecord, PaymentUuid},
        references::CodeClaim,
    },
    store::{Collection, DocumentStore, Documents, StoreError, Versioned},
};

#[derive(Debug, Clone)]
pub(crate) struct PaymentsRepository {
    payments: Documents<PaymentRecord>,
    references: Documents<CodeClaim>,
}

impl PaymentsRepository {
    pub(crate) fn new(store: &Arc<dyn DocumentStore>) -> Self {
        Self {
            payments: Documents::new(Arc::clone(store), Collection::Payments),
            references: Documents::new(Arc::clone(store), Collection::PaymentReferences),
        }
    }

    pub(crate) fn references(&self) -> &Documents<CodeClaim> {
        &self.references
    }

    pub(crate) async fn get(
        &self,
        payment: PaymentUuid,
    ) -> Result<Versioned<PaymentRecord>, StoreError> {
        self.payments.get(&payment.to_string()).await
    }

    pub(crate) async fn find(
        &self,
        payment: PaymentUuid,
    ) -> Result<Option<Versioned<PaymentRecord>>, StoreError> {
        self.payments.find(&payment.to_string()).await
    }

    pub(crate) async fn insert(
        &self,
        payment: PaymentRecord,
    ) -> Result<Versioned<PaymentRecord>, StoreError> {
        self.payments.insert(&payment.uuid.to_string(), payment).await
    }

    pub(crate) async fn replace(
        &self,
        expected_version: u64,
        payment: PaymentRecord,
    ) -> Result<Versioned<PaymentRecord>, StoreError> {
        self.payments
            .replace(&payment.uuid.to_string(), expected_version, payment)
            .await
    }
}
