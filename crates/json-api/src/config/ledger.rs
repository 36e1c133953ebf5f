//! Ledger Config

use clap::Args;
use jiff::SignedDuration;

use canteen_app::{
    config::{LedgerSettings, VoucherReleasePolicy},
    domain::loyalty::tiers::{TierLadder, TierLadderError},
};

/// Ledger settings.
#[derive(Debug, Args)]
pub struct LedgerConfig {
    /// Conditional-write attempts before an operation reports contention
    #[arg(long, env = "LEDGER_MAX_ATTEMPTS", default_value_t = 3_u32)]
    pub max_attempts: u32,

    /// Minutes a payment stays open before it expires
    #[arg(long, env = "PAYMENT_TTL_MINUTES", default_value_t = 15_i64)]
    pub payment_ttl_minutes: i64,

    /// When a reserved voucher use is handed back
    #[arg(
        long,
        env = "VOUCHER_RELEASE_POLICY",
        value_enum,
        default_value_t = VoucherReleasePolicy::OrderCancellation
    )]
    pub voucher_release_policy: VoucherReleasePolicy,

    /// Loyalty points earned per whole peso spent
    #[arg(long, env = "LOYALTY_POINTS_PER_PESO", default_value_t = 1_u64)]
    pub points_per_peso: u64,

    /// Points needed to reach the Silver tier
    #[arg(long, env = "LOYALTY_SILVER_POINTS", default_value_t = 500_u64)]
    pub silver_points: u64,

    /// Points needed to reach the Gold tier
    #[arg(long, env = "LOYALTY_GOLD_POINTS", default_value_t = 1_000_u64)]
    pub gold_points: u64,
}

impl LedgerConfig {
    /// Gather the flags into the settings the services are built with.
    ///
    /// # Errors
    ///
    /// Returns an error when the tier boundaries are not ascending.
    pub fn settings(&self) -> Result<LedgerSettings, TierLadderError> {
        Ok(LedgerSettings {
            max_attempts: self.max_attempts,
            payment_ttl: SignedDuration::from_mins(self.payment_ttl_minutes),
            release_policy: self.voucher_release_policy,
            points_per_unit: self.points_per_peso,
            tiers: TierLadder::with_boundaries(self.silver_points, self.gold_points)?,
        })
    }
}
