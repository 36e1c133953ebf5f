//! Loyalty Repository

use std::sync::Arc;

use crate::{
    domain::{loyalty::records::LoyaltyAccountRecord, parties::CustomerUuid},
    store::{Collection, DocumentStore, Documents, StoreError, Versioned},
};

#[derive(Debug, Clone)]
pub(crate) struct LoyaltyRepository {
    accounts: Documents<LoyaltyAccountRecord>,
}

impl LoyaltyRepository {
    pub(crate) fn new(store: &Arc<dyn DocumentStore>) -> Self {
        Self {
            accounts: Documents::new(Arc::clone(store), Collection::LoyaltyAccounts),
        }
    }

    pub(crate) async fn find(
        &self,
        customer: CustomerUuid,
    ) -> Result<Option<Versioned<LoyaltyAccountRecord>>, StoreError> {
        self.accounts.find(&customer.to_string()).await
    }

    pub(crate) async fn insert(
        &self,
        account: LoyaltyAccountRecord,
    ) -> Result<Versioned<LoyaltyAccountRecord>, StoreError> {
        self.accounts
            .insert(&account.customer.to_string(), account)
            .await
    }

    pub(crate) async fn replace(
        &self,
        expected_version: u64,
        account: LoyaltyAccountRecord,
    ) -> Result<Versioned<LoyaltyAccountRecord>, StoreError> {
        self.accounts
            .replace(&account.customer.to_string(), expected_version, account)
            .await
    }
}
