//! Loyalty

pub mod data;
mod errors;
pub mod records;
mod repository;
pub mod service;
pub mod tiers;

pub use errors::LoyaltyServiceError;
pub use service::*;
