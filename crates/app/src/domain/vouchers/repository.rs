//! Vouchers Repository

use std::sync::Arc;

use crate::{
    domain::{
        references::CodeClaim,
        vouchers::records::{VoucherRecord, VoucherUuid},
    },
    store::{Collection, DocumentStore, Documents, QueryFilter, StoreError, Versioned},
};

/// Voucher documents plus the claims that keep their codes unique.
#[derive(Debug, Clone)]
pub(crate) struct VouchersRepository {
    vouchers: Documents<VoucherRecord>,
    codes: Documents<CodeClaim>,
}

impl VouchersRepository {
    pub(crate) fn new(store: &Arc<dyn DocumentStore>) -> Self {
        Self {
            vouchers: Documents::new(Arc::clone(store), Collection::Vouchers),
            codes: Documents::new(Arc::clone(store), Collection::VoucherCodes),
        }
    }

    pub(crate) fn codes(&self) -> &Documents<CodeClaim> {
        &self.codes
    }

    pub(crate) async fn get(
        &self,
        voucher: VoucherUuid,
    ) -> Result<Versioned<VoucherRecord>, StoreError> {
        self.vouchers.get(&voucher.to_string()).await
    }

    pub(crate) async fn find_by_code(
        &self,
        code: &str,
    ) -> Result<Versioned<VoucherRecord>, StoreError> {
        let claim = self.codes.get(code).await?;

        self.vouchers.get(&claim.record.owner).await
    }

    pub(crate) async fn list_active(&self) -> Result<Vec<VoucherRecord>, StoreError> {
        let active = self
            .vouchers
            .query(QueryFilter::eq("is_active", true))
            .await?;

        Ok(active.into_iter().map(|versioned| versioned.record).collect())
    }

    pub(crate) async fn claim_code(
        &self,
        code: &str,
        claim: CodeClaim,
    ) -> Result<(), StoreError> {
        self.codes.insert(code, claim).await?;

        Ok(())
    }

    pub(crate) async fn insert(
        &self,
        voucher: VoucherRecord,
    ) -> Result<Versioned<VoucherRecord>, StoreError> {
        self.vouchers.insert(&voucher.uuid.to_string(), voucher).await
    }

    pub(crate) async fn replace(
        &self,
        expected_version: u64,
        voucher: VoucherRecord,
    ) -> Result<Versioned<VoucherRecord>, StoreError> {
        self.vouchers
            .replace(&voucher.uuid.to_string(), expected_version, voucher)
            .await
    }
}

/// Normalized form of a customer-entered voucher code.
pub(crate) fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
