//! Voucher Eligibility
//!
//! Pure checks, evaluated in a fixed order and stopping at the first failure,
//! so the reason reported to the customer is stable.

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Timestamp;

use crate::domain::{
    parties::Customer,
    vouchers::{
        data::Cart,
        records::{VoucherDiscount, VoucherRecord},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibleReason {
    Inactive,
    NotYetValid,
    Expired,
    UsageLimitReached,
    UserNotTargeted,
    StallNotTargeted,
    MinimumOrderNotMet { minimum: u64 },
}

impl IneligibleReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::NotYetValid => "not_yet_valid",
            Self::Expired => "expired",
            Self::UsageLimitReached => "usage_limit_reached",
            Self::UserNotTargeted => "user_not_targeted",
            Self::StallNotTargeted => "stall_not_targeted",
            Self::MinimumOrderNotMet { .. } => "minimum_order_not_met",
        }
    }
}

impl Display for IneligibleReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Inactive => f.write_str("voucher is not active"),
            Self::NotYetValid => f.write_str("voucher is not valid yet"),
            Self::Expired => f.write_str("voucher has expired"),
            Self::UsageLimitReached => f.write_str("voucher has no uses left"),
            Self::UserNotTargeted => f.write_str("voucher is not available to this customer"),
            Self::StallNotTargeted => f.write_str("voucher is not valid at this stall"),
            Self::MinimumOrderNotMet { minimum } => {
                write!(f, "order subtotal is below the minimum of {minimum}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible { discount: u64 },
    Ineligible(IneligibleReason),
}

impl Eligibility {
    #[must_use]
    pub const fn is_eligible(self) -> bool {
        matches!(self, Self::Eligible { .. })
    }
}

/// Evaluate `voucher` for `customer` and `cart` at `now`.
#[must_use]
pub fn check_eligibility(
    voucher: &VoucherRecord,
    customer: &Customer,
    cart: &Cart,
    now: Timestamp,
) -> Eligibility {
    match first_failure(voucher, customer, cart, now) {
        Some(reason) => Eligibility::Ineligible(reason),
        None => Eligibility::Eligible {
            discount: compute_discount(&voucher.discount, cart.subtotal),
        },
    }
}

fn first_failure(
    voucher: &VoucherRecord,
    customer: &Customer,
    cart: &Cart,
    now: Timestamp,
) -> Option<IneligibleReason> {
    if let Err(reason) = check_redeemable(voucher, now) {
        return Some(reason);
    }

    if voucher.usage_count >= voucher.max_usage {
        return Some(IneligibleReason::UsageLimitReached);
    }

    let email = customer.email.trim().to_lowercase();

    if !voucher
        .user_targeting
        .admits(|selected| selected.trim().to_lowercase() == email)
    {
        return Some(IneligibleReason::UserNotTargeted);
    }

    if !voucher
        .stall_targeting
        .admits(|selected| *selected == cart.stall)
    {
        return Some(IneligibleReason::StallNotTargeted);
    }

    if cart.subtotal < voucher.min_order_amount {
        return Some(IneligibleReason::MinimumOrderNotMet {
            minimum: voucher.min_order_amount,
        });
    }

    None
}

/// Active and inside the validity window.
fn check_redeemable(
    voucher: &VoucherRecord,
    now: Timestamp,
) -> Result<(), IneligibleReason> {
    if !voucher.is_active {
        return Err(IneligibleReason::Inactive);
    }

    if now < voucher.valid_from {
        return Err(IneligibleReason::NotYetValid);
    }

    if now > voucher.valid_until {
        return Err(IneligibleReason::Expired);
    }

    Ok(())
}

/// Discount in centavos for `subtotal`. Percentages round down.
#[must_use]
pub fn compute_discount(discount: &VoucherDiscount, subtotal: u64) -> u64 {
    match *discount {
        VoucherDiscount::FixedAmountOff { amount } => amount.min(subtotal),
        VoucherDiscount::PercentageOff {
            percentage,
            max_discount,
        } => {
            let raw = u128::from(subtotal) * u128::from(percentage) / 100;
            let raw = u64::try_from(raw).unwrap_or(u64::MAX).min(subtotal);

            max_discount.map_or(raw, |cap| raw.min(cap))
        }
    }
}
