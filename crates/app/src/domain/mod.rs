//! Canteen Domain Concerns

pub mod loyalty;
pub mod orders;
pub mod parties;
pub mod payments;
pub mod references;
pub mod vouchers;
