//! Ledger Settings

use clap::ValueEnum;
use jiff::SignedDuration;

use crate::domain::loyalty::tiers::TierLadder;

/// Conditional-write attempts before an operation gives up with
/// `RetryExhausted`.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// How long a payment stays open before it lazily expires.
pub const DEFAULT_PAYMENT_TTL: SignedDuration = SignedDuration::from_mins(15);

/// Loyalty points earned per whole currency unit spent.
pub const DEFAULT_POINTS_PER_UNIT: u64 = 1;

/// When a reserved voucher use is handed back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum VoucherReleasePolicy {
    /// Only when the order itself is cancelled.
    #[default]
    OrderCancellation,

    /// Also when the order's payment ends `FAILED` or `EXPIRED`.
    PaymentTermination,
}

impl VoucherReleasePolicy {
    #[must_use]
    pub const fn releases_on_payment_termination(self) -> bool {
        matches!(self, Self::PaymentTermination)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSettings {
    pub max_attempts: u32,
    pub payment_ttl: SignedDuration,
    pub release_policy: VoucherReleasePolicy,
    pub points_per_unit: u64,
    pub tiers: TierLadder,
}

impl LedgerSettings {
    /// Attempts as used by retry loops; never less than one.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            payment_ttl: DEFAULT_PAYMENT_TTL,
            release_policy: VoucherReleasePolicy::default(),
            points_per_unit: DEFAULT_POINTS_PER_UNIT,
            tiers: TierLadder::default(),
        }
    }
}
