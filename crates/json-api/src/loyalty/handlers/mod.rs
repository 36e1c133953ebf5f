//! Loyalty Handlers

pub(crate) mod get;
pub(crate) mod redeem;
