//! Orders service errors.

use thiserror::Error;

use crate::{
    domain::{
        orders::{pickup::PickupScanError, records::OrderStatus},
        vouchers::VouchersServiceError,
    },
    store::StoreError,
};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order already exists")]
    AlreadyExists,

    #[error("order not found")]
    NotFound,

    #[error("invalid order: {0}")]
    InvalidData(&'static str),

    #[error("invalid pickup scan: {0}")]
    InvalidScan(#[from] PickupScanError),

    #[error("order is not ready for pickup (status: {status})")]
    NotReady { status: OrderStatus },

    #[error("order was already picked up")]
    AlreadyCompleted,

    #[error("order cannot change from {status}")]
    WrongState { status: OrderStatus },

    #[error("voucher error")]
    Voucher(#[source] VouchersServiceError),

    #[error("order was modified concurrently too many times")]
    RetryExhausted,

    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for OrdersServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound,
            StoreError::AlreadyExists => Self::AlreadyExists,
            error => Self::Store(error),
        }
    }
}
