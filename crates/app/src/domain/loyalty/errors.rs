//! Loyalty service errors.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum LoyaltyServiceError {
    #[error("loyalty account not found")]
    NotFound,

    #[error("points must be a positive multiple of 100")]
    InvalidAmount,

    #[error("points must be positive")]
    InvalidPoints,

    #[error("insufficient points: {available} available, {requested} requested")]
    Insufficient { available: u64, requested: u64 },

    #[error("loyalty account was modified concurrently too many times")]
    RetryExhausted,

    #[error("storage error")]
    Store(#[source] StoreError),
}

impl From<StoreError> for LoyaltyServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::NotFound,
            error => Self::Store(error),
        }
    }
}
