//! Vouchers

pub mod data;
pub mod eligibility;
mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;

pub use errors::VouchersServiceError;
pub use service::*;
