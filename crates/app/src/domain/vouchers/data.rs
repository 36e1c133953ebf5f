//! Vouchers Data

use jiff::Timestamp;

use crate::domain::{
    parties::StallUuid,
    vouchers::records::{Targeting, VoucherDiscount, VoucherRecord, VoucherUuid},
};

/// New Voucher Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVoucher {
    pub uuid: VoucherUuid,
    pub code: String,
    pub discount: VoucherDiscount,
    pub min_order_amount: u64,
    pub valid_from: Timestamp,
    pub valid_until: Timestamp,
    pub max_usage: u64,
    pub user_targeting: Targeting<String>,
    pub stall_targeting: Targeting<StallUuid>,
    pub is_active: bool,
}

/// The part of a checkout cart eligibility looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cart {
    pub stall: StallUuid,
    pub subtotal: u64,
}

/// Result of previewing a voucher code against a cart.
///
/// `usage_count` is the value to pass back as the expectation when ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountPreview {
    pub voucher: VoucherUuid,
    pub code: String,
    pub usage_count: u64,
    pub discount: u64,
}

/// A voucher the customer could apply right now, with its discount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableVoucher {
    pub voucher: VoucherRecord,
    pub discount: u64,
}

/// One use of a voucher taken for a specific customer and cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedVoucher {
    pub voucher: VoucherRecord,
    pub discount: u64,
}
