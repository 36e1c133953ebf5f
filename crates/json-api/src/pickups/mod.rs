//! Pickups

mod handlers;

pub(crate) use handlers::*;
