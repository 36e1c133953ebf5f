//! GCash Payments

pub mod data;
mod errors;
pub mod instructions;
pub mod phone;
pub mod records;
pub mod reference_number;
mod repository;
pub mod service;
pub mod state;

pub use errors::PaymentsServiceError;
pub use service::*;
