//! Payments service errors.

use thiserror::Error;

use crate::{
    domain::{
        orders::{OrdersServiceError, records::OrderStatus},
        payments::{
            phone::PhoneNumberError, records::PaymentUuid,
            reference_number::ReferenceNumberError, state::PaymentStatus,
        },
    },
    store::StoreError,
};

#[derive(Debug, Error)]
pub enum PaymentsServiceError {
    #[error("payment not found")]
    NotFound,

    #[error("order not found")]
    OrderNotFound,

    #[error("order is {status} and cannot take a payment")]
    OrderClosed { status: OrderStatus },

    #[error("order already has an open payment {payment}")]
    ActivePaymentExists { payment: PaymentUuid },

    #[error("payment cannot do that while {status}")]
    WrongState { status: PaymentStatus },

    #[error("transferred amount {observed} does not match expected {expected}")]
    AmountMismatch { expected: u64, observed: u64 },

    #[error("invalid GCash reference number")]
    InvalidReferenceNumber(#[from] ReferenceNumberError),

    #[error("invalid GCash number")]
    InvalidPhoneNumber(#[from] PhoneNumberError),

    #[error("payment was modified concurrently too many times")]
    RetryExhausted,

    #[error("order error")]
    Order(#[source] OrdersServiceError),

    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for PaymentsServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound,
            error => Self::Store(error),
        }
    }
}
