//! Orders Data

use crate::domain::{
    orders::records::OrderUuid,
    parties::{Customer, StallUuid},
    vouchers::records::VoucherUuid,
};

/// A voucher to apply to a new order.
///
/// `expected_usage_count` is the count the checkout saw when it previewed the
/// code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderVoucher {
    pub voucher: VoucherUuid,
    pub expected_usage_count: u64,
}

/// New Order Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub customer: Customer,
    pub stall: StallUuid,
    pub subtotal: u64,
    pub voucher: Option<OrderVoucher>,
}
