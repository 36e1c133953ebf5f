//! Pickup Handlers

pub(crate) mod confirm;
