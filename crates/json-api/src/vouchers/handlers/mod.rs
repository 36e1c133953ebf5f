//! Voucher Handlers

pub(crate) mod available;
pub(crate) mod create;
pub(crate) mod get;
pub(crate) mod preview;
