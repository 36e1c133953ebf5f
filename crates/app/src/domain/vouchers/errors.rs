//! Vouchers service errors.

use thiserror::Error;

use crate::{domain::vouchers::eligibility::IneligibleReason, store::StoreError};

#[derive(Debug, Error)]
pub enum VouchersServiceError {
    #[error("voucher code already exists")]
    AlreadyExists,

    #[error("voucher not found")]
    NotFound,

    #[error("invalid voucher: {0}")]
    InvalidData(&'static str),

    #[error("voucher cannot be redeemed: {0}")]
    NotRedeemable(IneligibleReason),

    #[error("voucher has no uses left")]
    Exhausted,

    #[error("voucher was modified concurrently too many times")]
    RetryExhausted,

    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for VouchersServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound,
            StoreError::AlreadyExists => Self::AlreadyExists,
            error => Self::Store(error),
        }
    }
}
