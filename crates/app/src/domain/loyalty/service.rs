//! Loyalty Service

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use smallvec::smallvec;
use tracing::{error, info, warn};

use crate::{
    clock::Clock,
    config::LedgerSettings,
    domain::{
        loyalty::{
            LoyaltyServiceError,
            data::{LoyaltySummary, PointsRedemption},
            records::{LoyaltyAccountRecord, LoyaltyTransaction, TransactionKind},
            repository::LoyaltyRepository,
            tiers::TierLadder,
        },
        parties::{Customer, CustomerUuid},
        references::{self, LOYALTY_VOUCHER_PREFIX},
        vouchers::{
            records::{Targeting, VoucherDiscount, VoucherRecord, VoucherUuid},
            repository::VouchersRepository,
        },
    },
    store::{DocumentStore, StoreError, Versioned},
};

/// Points are redeemed in blocks of this size.
pub const POINTS_REDEMPTION_STEP: u64 = 100;

/// Value of one redeemed point, in centavos.
pub const CENTAVOS_PER_POINT: u64 = 10;

/// How long a voucher minted from points stays valid.
pub const REDEEMED_VOUCHER_VALIDITY: SignedDuration = SignedDuration::from_hours(24 * 30);

const CENTAVOS_PER_UNIT: u64 = 100;

#[derive(Debug, Clone)]
pub struct StoreLoyaltyService {
    accounts: LoyaltyRepository,
    vouchers: VouchersRepository,
    clock: Arc<dyn Clock>,
    max_attempts: u32,
    points_per_unit: u64,
    tiers: TierLadder,
}

impl StoreLoyaltyService {
    #[must_use]
    pub fn new(
        store: &Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        settings: &LedgerSettings,
    ) -> Self {
        Self {
            accounts: LoyaltyRepository::new(store),
            vouchers: VouchersRepository::new(store),
            clock,
            max_attempts: settings.attempts(),
            points_per_unit: settings.points_per_unit,
            tiers: settings.tiers.clone(),
        }
    }

    /// Take `amount` points off the balance and record the redemption in the
    /// same write.
    async fn debit(
        &self,
        customer: CustomerUuid,
        amount: u64,
        expected_balance: u64,
        voucher_code: &str,
    ) -> Result<LoyaltyAccountRecord, LoyaltyServiceError> {
        let mut expected = Some(expected_balance);

        for attempt in 1..=self.max_attempts {
            let Some(Versioned { version, record }) = self.accounts.find(customer).await? else {
                return Err(LoyaltyServiceError::Insufficient {
                    available: 0,
                    requested: amount,
                });
            };

            if record.points < amount {
                return Err(LoyaltyServiceError::Insufficient {
                    available: record.points,
                    requested: amount,
                });
            }

            if let Some(expected_balance) = expected.take()
                && expected_balance != record.points
            {
                warn!(
                    attempt,
                    expected_balance,
                    points = record.points,
                    "balance moved since it was read"
                );

                continue;
            }

            let now = self.clock.now();
            let mut next = record;

            next.points -= amount;
            next.updated_at = now;
            next.transactions.push(LoyaltyTransaction {
                kind: TransactionKind::Redeemed,
                points: amount,
                description: format!("Redeemed for voucher {voucher_code}"),
                voucher_code: Some(voucher_code.to_owned()),
                timestamp: now,
            });

            match self.accounts.replace(version, next).await {
                Ok(debited) => return Ok(debited.record),
                Err(StoreError::Conflict) => {
                    warn!(attempt, "points redemption conflicted, retrying");
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(LoyaltyServiceError::RetryExhausted)
    }

    /// Switch on a voucher minted inactive by a redemption.
    async fn activate(
        &self,
        minted: Versioned<VoucherRecord>,
    ) -> Result<VoucherRecord, LoyaltyServiceError> {
        let mut current = minted;

        for attempt in 1..=self.max_attempts {
            let next = VoucherRecord {
                is_active: true,
                updated_at: self.clock.now(),
                ..current.record.clone()
            };

            match self.vouchers.replace(current.version, next).await {
                Ok(active) => return Ok(active.record),
                Err(StoreError::Conflict) => {
                    warn!(attempt, "voucher activation conflicted, retrying");

                    current = self.vouchers.get(current.record.uuid).await?;
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(LoyaltyServiceError::RetryExhausted)
    }

    fn summarize(
        &self,
        customer: CustomerUuid,
        account: Option<LoyaltyAccountRecord>,
    ) -> LoyaltySummary {
        let (points, transactions) = account
            .map(|account| (account.points, account.transactions))
            .unwrap_or_default();

        LoyaltySummary {
            customer,
            points,
            tier: self.tiers.tier_for(points),
            next_tier: self.tiers.next_tier(points),
            transactions,
        }
    }
}

#[async_trait]
impl LoyaltyService for StoreLoyaltyService {
    #[tracing::instrument(
        name = "loyalty.service.get_account",
        skip(self),
        fields(customer_uuid = %customer),
        err
    )]
    async fn get_account(
        &self,
        customer: CustomerUuid,
    ) -> Result<LoyaltySummary, LoyaltyServiceError> {
        let account = self.accounts.find(customer).await?;

        Ok(self.summarize(customer, account.map(|versioned| versioned.record)))
    }

    #[tracing::instrument(
        name = "loyalty.service.earn_points",
        skip(self, customer, description),
        fields(customer_uuid = %customer.uuid),
        err
    )]
    async fn earn_points(
        &self,
        customer: Customer,
        points: u64,
        description: String,
    ) -> Result<LoyaltyAccountRecord, LoyaltyServiceError> {
        if points == 0 {
            return Err(LoyaltyServiceError::InvalidPoints);
        }

        for attempt in 1..=self.max_attempts {
            let now = self.clock.now();
            let transaction = LoyaltyTransaction {
                kind: TransactionKind::Earned,
                points,
                description: description.clone(),
                voucher_code: None,
                timestamp: now,
            };

            let written = match self.accounts.find(customer.uuid).await? {
                None => {
                    self.accounts
                        .insert(LoyaltyAccountRecord {
                            customer: customer.uuid,
                            email: customer.email.clone(),
                            points,
                            transactions: vec![transaction],
                            created_at: now,
                            updated_at: now,
                        })
                        .await
                }
                Some(Versioned { version, record }) => {
                    let mut next = record;

                    next.points = next
                        .points
                        .checked_add(points)
                        .ok_or(LoyaltyServiceError::InvalidPoints)?;
                    next.updated_at = now;
                    next.transactions.push(transaction);

                    self.accounts.replace(version, next).await
                }
            };

            match written {
                Ok(account) => {
                    info!(balance = account.record.points, "earned points");

                    return Ok(account.record);
                }
                Err(StoreError::Conflict | StoreError::AlreadyExists) => {
                    warn!(attempt, "points credit conflicted, retrying");
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(LoyaltyServiceError::RetryExhausted)
    }

    #[tracing::instrument(
        name = "loyalty.service.redeem_points",
        skip(self, customer),
        fields(customer_uuid = %customer.uuid),
        err
    )]
    async fn redeem_points(
        &self,
        customer: Customer,
        amount: u64,
        expected_balance: u64,
    ) -> Result<PointsRedemption, LoyaltyServiceError> {
        if amount == 0 || amount % POINTS_REDEMPTION_STEP != 0 {
            return Err(LoyaltyServiceError::InvalidAmount);
        }

        if amount > expected_balance {
            return Err(LoyaltyServiceError::Insufficient {
                available: expected_balance,
                requested: amount,
            });
        }

        let voucher_uuid = VoucherUuid::new();
        let now = self.clock.now();

        let code = references::claim_generated_code(
            self.vouchers.codes(),
            LOYALTY_VOUCHER_PREFIX,
            voucher_uuid.to_string(),
            now,
            self.max_attempts,
        )
        .await?;

        let minted = self
            .vouchers
            .insert(redeemed_voucher(voucher_uuid, code, &customer, amount, now))
            .await?;

        let account = self
            .debit(customer.uuid, amount, expected_balance, &minted.record.code)
            .await?;

        let voucher = self.activate(minted).await.inspect_err(|error| {
            error!(
                %error,
                voucher_uuid = %voucher_uuid,
                "points were debited but the voucher was left inactive"
            );
        })?;

        info!(
            balance = account.points,
            voucher_code = %voucher.code,
            "redeemed points"
        );

        Ok(PointsRedemption { account, voucher })
    }

    fn points_for_order(&self, total: u64) -> u64 {
        (total / CENTAVOS_PER_UNIT).saturating_mul(self.points_per_unit)
    }
}

/// Single-use fixed-amount voucher only the redeeming customer can apply.
/// Stored inactive until the points behind it are debited.
fn redeemed_voucher(
    uuid: VoucherUuid,
    code: String,
    customer: &Customer,
    points: u64,
    now: Timestamp,
) -> VoucherRecord {
    VoucherRecord {
        uuid,
        code,
        discount: VoucherDiscount::FixedAmountOff {
            amount: points.saturating_mul(CENTAVOS_PER_POINT),
        },
        min_order_amount: 0,
        valid_from: now,
        valid_until: now
            .checked_add(REDEEMED_VOUCHER_VALIDITY)
            .unwrap_or(Timestamp::MAX),
        max_usage: 1,
        usage_count: 0,
        user_targeting: Targeting::Selected(smallvec![customer.email.clone()]),
        stall_targeting: Targeting::All,
        is_active: false,
        created_at: now,
        updated_at: now,
    }
}

#[automock]
#[async_trait]
pub trait LoyaltyService: Send + Sync {
    /// Balance, tier and history. Customers without an account have zero
    /// points.
    async fn get_account(
        &self,
        customer: CustomerUuid,
    ) -> Result<LoyaltySummary, LoyaltyServiceError>;

    /// Credit points, opening the account on first earn.
    async fn earn_points(
        &self,
        customer: Customer,
        points: u64,
        description: String,
    ) -> Result<LoyaltyAccountRecord, LoyaltyServiceError>;

    /// Exchange points for a single-use voucher.
    async fn redeem_points(
        &self,
        customer: Customer,
        amount: u64,
        expected_balance: u64,
    ) -> Result<PointsRedemption, LoyaltyServiceError>;

    /// Points earned for an order total in centavos.
    fn points_for_order(&self, total: u64) -> u64;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            loyalty::tiers::{LoyaltyTier, NextTier},
            parties::StallUuid,
            vouchers::{VouchersService, data::Cart},
        },
        store::Collection,
        test::{FaultyStore, TestContext, helpers},
    };

    use super::*;

    #[tokio::test]
    async fn first_earn_opens_the_account() -> TestResult {
        let ctx = TestContext::new();
        let customer = helpers::customer();

        let account = ctx
            .loyalty
            .earn_points(customer.clone(), 120, "Order #1".to_owned())
            .await?;

        assert_eq!(account.points, 120);
        assert_eq!(account.email, customer.email);
        assert_eq!(account.transactions.len(), 1);

        let account = ctx
            .loyalty
            .earn_points(customer, 80, "Order #2".to_owned())
            .await?;

        assert_eq!(account.points, 200);
        assert_eq!(account.transactions.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn earning_zero_points_is_rejected() {
        let ctx = TestContext::new();

        let result = ctx
            .loyalty
            .earn_points(helpers::customer(), 0, "nothing".to_owned())
            .await;

        assert!(
            matches!(result, Err(LoyaltyServiceError::InvalidPoints)),
            "expected InvalidPoints, got {result:?}"
        );
    }

    #[tokio::test]
    async fn summary_for_unknown_customer_is_empty_bronze() -> TestResult {
        let ctx = TestContext::new();

        let summary = ctx.loyalty.get_account(CustomerUuid::new()).await?;

        assert_eq!(summary.points, 0);
        assert_eq!(summary.tier, LoyaltyTier::Bronze);
        assert_eq!(
            summary.next_tier,
            Some(NextTier {
                tier: LoyaltyTier::Silver,
                points_needed: 500,
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn summary_reports_tier_progress() -> TestResult {
        let ctx = TestContext::new();
        let customer = helpers::customer();

        ctx.loyalty
            .earn_points(customer.clone(), 650, "Semester bonus".to_owned())
            .await?;

        let summary = ctx.loyalty.get_account(customer.uuid).await?;

        assert_eq!(summary.tier, LoyaltyTier::Silver);
        assert_eq!(
            summary.next_tier,
            Some(NextTier {
                tier: LoyaltyTier::Gold,
                points_needed: 350,
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn redeeming_points_debits_and_mints_a_voucher() -> TestResult {
        let ctx = TestContext::new();
        let customer = helpers::customer();

        ctx.loyalty
            .earn_points(customer.clone(), 250, "Orders".to_owned())
            .await?;

        let redemption = ctx
            .loyalty
            .redeem_points(customer.clone(), 100, 250)
            .await?;

        assert_eq!(redemption.account.points, 150);
        assert_eq!(
            redemption.voucher.discount,
            VoucherDiscount::FixedAmountOff { amount: 1_000 }
        );
        assert_eq!(redemption.voucher.max_usage, 1);
        assert!(redemption.voucher.is_active);
        assert!(redemption.voucher.code.starts_with("PTS-"));

        let last = redemption.account.transactions.last();

        assert_eq!(last.map(|t| t.kind), Some(TransactionKind::Redeemed));
        assert_eq!(
            last.and_then(|t| t.voucher_code.as_deref()),
            Some(redemption.voucher.code.as_str())
        );

        let result = ctx.loyalty.redeem_points(customer.clone(), 200, 150).await;

        assert!(
            matches!(
                result,
                Err(LoyaltyServiceError::Insufficient {
                    available: 150,
                    requested: 200
                })
            ),
            "expected Insufficient, got {result:?}"
        );

        let summary = ctx.loyalty.get_account(customer.uuid).await?;

        assert_eq!(summary.points, 150);

        Ok(())
    }

    #[test]
    fn minted_voucher_is_worth_ten_centavos_per_point_and_starts_inactive() {
        let voucher = redeemed_voucher(
            VoucherUuid::new(),
            "PTS-TEST".to_owned(),
            &helpers::customer(),
            500,
            Timestamp::UNIX_EPOCH,
        );

        assert_eq!(
            voucher.discount,
            VoucherDiscount::FixedAmountOff { amount: 5_000 }
        );
        assert!(!voucher.is_active);
    }

    #[tokio::test]
    async fn redemption_keeps_points_when_the_voucher_cannot_be_stored() -> TestResult {
        let store = FaultyStore::new()
            .refuse_inserts(Collection::Vouchers)
            .shared();
        let ctx = TestContext::with_store(store, LedgerSettings::default());
        let customer = helpers::customer();

        ctx.loyalty
            .earn_points(customer.clone(), 300, "Orders".to_owned())
            .await?;

        let result = ctx.loyalty.redeem_points(customer.clone(), 200, 300).await;

        assert!(
            matches!(result, Err(LoyaltyServiceError::Store(_))),
            "expected Store, got {result:?}"
        );

        let summary = ctx.loyalty.get_account(customer.uuid).await?;

        assert_eq!(summary.points, 300);
        assert_eq!(summary.transactions.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn failed_debit_leaves_no_usable_voucher() -> TestResult {
        let ctx = TestContext::new();
        let customer = helpers::customer();

        ctx.loyalty
            .earn_points(customer.clone(), 100, "Orders".to_owned())
            .await?;

        let result = ctx.loyalty.redeem_points(customer.clone(), 200, 500).await;

        assert!(
            matches!(
                result,
                Err(LoyaltyServiceError::Insufficient {
                    available: 100,
                    requested: 200
                })
            ),
            "expected Insufficient, got {result:?}"
        );

        let cart = Cart {
            stall: StallUuid::new(),
            subtotal: 5_000,
        };

        let available = ctx
            .vouchers
            .list_available_vouchers(customer, cart)
            .await?;

        assert!(available.is_empty(), "unexpected vouchers: {available:?}");

        Ok(())
    }

    #[tokio::test]
    async fn minted_voucher_only_applies_for_its_owner() -> TestResult {
        let ctx = TestContext::new();
        let customer = helpers::customer();

        ctx.loyalty
            .earn_points(customer.clone(), 300, "Orders".to_owned())
            .await?;

        let redemption = ctx.loyalty.redeem_points(customer.clone(), 200, 300).await?;

        let cart = Cart {
            stall: StallUuid::new(),
            subtotal: 5_000,
        };

        let preview = ctx
            .vouchers
            .preview_discount(redemption.voucher.code.clone(), customer, cart)
            .await?;

        assert_eq!(preview.discount, 2_000);

        let stranger = Customer::new(CustomerUuid::new(), "ben@campus.edu");

        let result = ctx
            .vouchers
            .preview_discount(redemption.voucher.code, stranger, cart)
            .await;

        assert!(result.is_err(), "stranger could apply {result:?}");

        Ok(())
    }

    #[tokio::test]
    async fn redemption_amount_must_be_a_positive_multiple_of_100() {
        let ctx = TestContext::new();

        for amount in [0, 50, 150] {
            let result = ctx
                .loyalty
                .redeem_points(helpers::customer(), amount, 1_000)
                .await;

            assert!(
                matches!(result, Err(LoyaltyServiceError::InvalidAmount)),
                "expected InvalidAmount for {amount}, got {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn redeeming_without_an_account_is_insufficient() {
        let ctx = TestContext::new();

        let result = ctx
            .loyalty
            .redeem_points(helpers::customer(), 100, 100)
            .await;

        assert!(
            matches!(
                result,
                Err(LoyaltyServiceError::Insufficient { available: 0, .. })
            ),
            "expected Insufficient, got {result:?}"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_redemptions_never_overdraw() -> TestResult {
        let ctx = TestContext::new();
        let customer = helpers::customer();

        ctx.loyalty
            .earn_points(customer.clone(), 300, "Orders".to_owned())
            .await?;

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let loyalty = ctx.loyalty.clone();
                let customer = customer.clone();

                tokio::spawn(async move {
                    let balance = loyalty.get_account(customer.uuid).await?.points;

                    loyalty.redeem_points(customer, 100, balance).await
                })
            })
            .collect();

        let mut redeemed = 0_u64;

        for handle in handles {
            match handle.await? {
                Ok(_) => redeemed += 100,
                Err(
                    LoyaltyServiceError::Insufficient { .. } | LoyaltyServiceError::RetryExhausted,
                ) => {}
                Err(error) => return Err(error.into()),
            }
        }

        let summary = ctx.loyalty.get_account(customer.uuid).await?;

        assert!(redeemed <= 300);
        assert_eq!(summary.points, 300 - redeemed);

        Ok(())
    }

    #[test]
    fn points_for_order_uses_whole_currency_units() {
        let ctx = TestContext::new();

        assert_eq!(ctx.loyalty.points_for_order(15_099), 150);
        assert_eq!(ctx.loyalty.points_for_order(99), 0);
    }
}
