//! Loyalty Data

use crate::domain::{
    loyalty::{
        records::{LoyaltyAccountRecord, LoyaltyTransaction},
        tiers::{LoyaltyTier, NextTier},
    },
    parties::CustomerUuid,
    vouchers::records::VoucherRecord,
};

/// Balance, tier standing and history for one customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoyaltySummary {
    pub customer: CustomerUuid,
    pub points: u64,
    pub tier: LoyaltyTier,
    pub next_tier: Option<NextTier>,
    pub transactions: Vec<LoyaltyTransaction>,
}

/// The debited account and the voucher minted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsRedemption {
    pub account: LoyaltyAccountRecord,
    pub voucher: VoucherRecord,
}
