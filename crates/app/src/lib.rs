//! Transactional core of the campus canteen: vouchers, loyalty points, orders,
//! GCash payments and pickup verification over a versioned document store.

pub mod clock;
pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod store;

#[cfg(test)]
mod test;

mod uuids;

pub use uuids::TypedUuid;
