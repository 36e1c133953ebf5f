//! Voucher Records

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{domain::parties::StallUuid, uuids::TypedUuid};

/// Voucher UUID
pub type VoucherUuid = TypedUuid<VoucherRecord>;

/// What a voucher takes off the subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VoucherDiscount {
    /// Fixed amount in centavos.
    FixedAmountOff { amount: u64 },

    /// Whole-number percentage, optionally capped.
    PercentageOff {
        percentage: u16,
        max_discount: Option<u64>,
    },
}

impl VoucherDiscount {
    #[must_use]
    pub const fn to_str(&self) -> &'static str {
        match self {
            Self::FixedAmountOff { .. } => "amount_off",
            Self::PercentageOff { .. } => "percentage_off",
        }
    }
}

/// Who or where a voucher applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "selected", rename_all = "snake_case")]
pub enum Targeting<T> {
    All,
    Selected(SmallVec<[T; 4]>),
}

impl<T> Default for Targeting<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T> Targeting<T> {
    /// `true` for [`Targeting::All`], otherwise whether any selected entry
    /// satisfies `matches`.
    pub fn admits(&self, matches: impl Fn(&T) -> bool) -> bool {
        match self {
            Self::All => true,
            Self::Selected(selected) => selected.iter().any(matches),
        }
    }
}

/// Voucher Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherRecord {
    pub uuid: VoucherUuid,
    pub code: String,
    pub discount: VoucherDiscount,
    pub min_order_amount: u64,
    pub valid_from: Timestamp,
    pub valid_until: Timestamp,
    pub max_usage: u64,
    pub usage_count: u64,
    pub user_targeting: Targeting<String>,
    pub stall_targeting: Targeting<StallUuid>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl VoucherRecord {
    #[must_use]
    pub fn remaining_uses(&self) -> u64 {
        self.max_usage.saturating_sub(self.usage_count)
    }
}
