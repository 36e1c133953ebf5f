//! Vouchers Service
//!
//! Reservations move `usage_count` with version-conditioned writes. A stale
//! read is never written back: on conflict the voucher is read again and the
//! guards are re-evaluated against the fresh count.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{Span, info, warn};

use crate::{
    clock::Clock,
    domain::{
        parties::Customer,
        references::CodeClaim,
        vouchers::{
            VouchersServiceError,
            data::{AvailableVoucher, Cart, DiscountPreview, NewVoucher, ReservedVoucher},
            eligibility::{self, Eligibility, IneligibleReason},
            records::{VoucherDiscount, VoucherRecord, VoucherUuid},
            repository::{VouchersRepository, normalize_code},
        },
    },
    store::{DocumentStore, StoreError, Versioned},
};

#[derive(Debug, Clone)]
pub struct StoreVouchersService {
    repository: VouchersRepository,
    clock: Arc<dyn Clock>,
    max_attempts: u32,
}

impl StoreVouchersService {
    #[must_use]
    pub fn new(store: &Arc<dyn DocumentStore>, clock: Arc<dyn Clock>, max_attempts: u32) -> Self {
        Self {
            repository: VouchersRepository::new(store),
            clock,
            max_attempts: max_attempts.max(1),
        }
    }
}

#[async_trait]
impl VouchersService for StoreVouchersService {
    #[tracing::instrument(
        name = "vouchers.service.create_voucher",
        skip(self, voucher),
        fields(voucher_uuid = %voucher.uuid, code = tracing::field::Empty),
        err
    )]
    async fn create_voucher(
        &self,
        voucher: NewVoucher,
    ) -> Result<VoucherRecord, VouchersServiceError> {
        validate_new_voucher(&voucher)?;

        let code = normalize_code(&voucher.code);
        let now = self.clock.now();

        Span::current().record("code", tracing::field::display(&code));

        self.repository
            .claim_code(
                &code,
                CodeClaim {
                    owner: voucher.uuid.to_string(),
                    claimed_at: now,
                },
            )
            .await?;

        let record = VoucherRecord {
            uuid: voucher.uuid,
            code,
            discount: voucher.discount,
            min_order_amount: voucher.min_order_amount,
            valid_from: voucher.valid_from,
            valid_until: voucher.valid_until,
            max_usage: voucher.max_usage,
            usage_count: 0,
            user_targeting: voucher.user_targeting,
            stall_targeting: voucher.stall_targeting,
            is_active: voucher.is_active,
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.insert(record).await?;

        info!("created voucher");

        Ok(created.record)
    }

    #[tracing::instrument(
        name = "vouchers.service.get_voucher",
        skip(self),
        fields(voucher_uuid = %voucher),
        err
    )]
    async fn get_voucher(&self, voucher: VoucherUuid) -> Result<VoucherRecord, VouchersServiceError> {
        Ok(self.repository.get(voucher).await?.record)
    }

    #[tracing::instrument(name = "vouchers.service.find_voucher_by_code", skip(self), err)]
    async fn find_voucher_by_code(
        &self,
        code: String,
    ) -> Result<VoucherRecord, VouchersServiceError> {
        Ok(self
            .repository
            .find_by_code(&normalize_code(&code))
            .await?
            .record)
    }

    #[tracing::instrument(
        name = "vouchers.service.list_available_vouchers",
        skip(self, customer),
        fields(customer_uuid = %customer.uuid, stall_uuid = %cart.stall),
        err
    )]
    async fn list_available_vouchers(
        &self,
        customer: Customer,
        cart: Cart,
    ) -> Result<Vec<AvailableVoucher>, VouchersServiceError> {
        let now = self.clock.now();

        let available = self
            .repository
            .list_active()
            .await?
            .into_iter()
            .filter_map(
                |voucher| match eligibility::check_eligibility(&voucher, &customer, &cart, now) {
                    Eligibility::Eligible { discount } => Some(AvailableVoucher { voucher, discount }),
                    Eligibility::Ineligible(_) => None,
                },
            )
            .collect();

        Ok(available)
    }

    #[tracing::instrument(
        name = "vouchers.service.preview_discount",
        skip(self, customer),
        fields(customer_uuid = %customer.uuid, subtotal = cart.subtotal),
        err
    )]
    async fn preview_discount(
        &self,
        code: String,
        customer: Customer,
        cart: Cart,
    ) -> Result<DiscountPreview, VouchersServiceError> {
        let voucher = self
            .repository
            .find_by_code(&normalize_code(&code))
            .await?
            .record;

        match eligibility::check_eligibility(&voucher, &customer, &cart, self.clock.now()) {
            Eligibility::Eligible { discount } => Ok(DiscountPreview {
                voucher: voucher.uuid,
                code: voucher.code,
                usage_count: voucher.usage_count,
                discount,
            }),
            Eligibility::Ineligible(reason) => Err(VouchersServiceError::NotRedeemable(reason)),
        }
    }

    #[tracing::instrument(
        name = "vouchers.service.reserve_voucher",
        skip(self, customer),
        fields(voucher_uuid = %voucher, customer_uuid = %customer.uuid),
        err
    )]
    async fn reserve_voucher(
        &self,
        voucher: VoucherUuid,
        expected_usage_count: u64,
        customer: Customer,
        cart: Cart,
    ) -> Result<ReservedVoucher, VouchersServiceError> {
        let mut expected = Some(expected_usage_count);

        for attempt in 1..=self.max_attempts {
            let Versioned { version, record } = self.repository.get(voucher).await?;
            let now = self.clock.now();

            let discount = match eligibility::check_eligibility(&record, &customer, &cart, now) {
                Eligibility::Eligible { discount } => discount,
                Eligibility::Ineligible(IneligibleReason::UsageLimitReached) => {
                    return Err(VouchersServiceError::Exhausted);
                }
                Eligibility::Ineligible(reason) => {
                    return Err(VouchersServiceError::NotRedeemable(reason));
                }
            };

            if let Some(expected_count) = expected.take()
                && expected_count != record.usage_count
            {
                warn!(
                    attempt,
                    expected_count,
                    usage_count = record.usage_count,
                    "usage count moved since it was read"
                );

                continue;
            }

            let next = VoucherRecord {
                usage_count: record.usage_count + 1,
                updated_at: now,
                ..record
            };

            match self.repository.replace(version, next).await {
                Ok(reserved) => {
                    info!(usage_count = reserved.record.usage_count, "reserved voucher");

                    return Ok(ReservedVoucher {
                        voucher: reserved.record,
                        discount,
                    });
                }
                Err(StoreError::Conflict) => {
                    warn!(attempt, "voucher reservation conflicted, retrying");
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(VouchersServiceError::RetryExhausted)
    }

    #[tracing::instrument(
        name = "vouchers.service.release_voucher",
        skip(self),
        fields(voucher_uuid = %voucher),
        err
    )]
    async fn release_voucher(
        &self,
        voucher: VoucherUuid,
    ) -> Result<VoucherRecord, VouchersServiceError> {
        for attempt in 1..=self.max_attempts {
            let Versioned { version, record } = self.repository.get(voucher).await?;

            if record.usage_count == 0 {
                warn!("release requested for a voucher with no recorded uses");

                return Ok(record);
            }

            let next = VoucherRecord {
                usage_count: record.usage_count - 1,
                updated_at: self.clock.now(),
                ..record
            };

            match self.repository.replace(version, next).await {
                Ok(released) => {
                    info!(usage_count = released.record.usage_count, "released voucher");

                    return Ok(released.record);
                }
                Err(StoreError::Conflict) => {
                    warn!(attempt, "voucher release conflicted, retrying");
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(VouchersServiceError::RetryExhausted)
    }
}

fn validate_new_voucher(voucher: &NewVoucher) -> Result<(), VouchersServiceError> {
    let code = voucher.code.trim();

    if code.is_empty() {
        return Err(VouchersServiceError::InvalidData("code cannot be empty"));
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(VouchersServiceError::InvalidData(
            "code may only contain letters, digits, dashes and underscores",
        ));
    }

    if voucher.valid_until < voucher.valid_from {
        return Err(VouchersServiceError::InvalidData(
            "validity window ends before it starts",
        ));
    }

    if voucher.max_usage == 0 {
        return Err(VouchersServiceError::InvalidData("max usage must be positive"));
    }

    match voucher.discount {
        VoucherDiscount::FixedAmountOff { amount: 0 } => Err(VouchersServiceError::InvalidData(
            "fixed discount must be positive",
        )),
        VoucherDiscount::PercentageOff { percentage, .. } if !(1..=100).contains(&percentage) => {
            Err(VouchersServiceError::InvalidData(
                "percentage must be between 1 and 100",
            ))
        }
        _ => Ok(()),
    }
}

#[automock]
#[async_trait]
pub trait VouchersService: Send + Sync {
    /// Create a voucher, claiming its code.
    async fn create_voucher(&self, voucher: NewVoucher)
    -> Result<VoucherRecord, VouchersServiceError>;

    /// Retrieve a voucher.
    async fn get_voucher(&self, voucher: VoucherUuid) -> Result<VoucherRecord, VouchersServiceError>;

    /// Retrieve a voucher by its (case-insensitive) code.
    async fn find_voucher_by_code(&self, code: String)
    -> Result<VoucherRecord, VouchersServiceError>;

    /// Active vouchers the customer could apply to this cart now.
    async fn list_available_vouchers(
        &self,
        customer: Customer,
        cart: Cart,
    ) -> Result<Vec<AvailableVoucher>, VouchersServiceError>;

    /// Evaluate a code against a cart without reserving anything.
    async fn preview_discount(
        &self,
        code: String,
        customer: Customer,
        cart: Cart,
    ) -> Result<DiscountPreview, VouchersServiceError>;

    /// Take one use of a voucher for this customer and cart. Eligibility is
    /// evaluated against every fresh read, not just the first.
    async fn reserve_voucher(
        &self,
        voucher: VoucherUuid,
        expected_usage_count: u64,
        customer: Customer,
        cart: Cart,
    ) -> Result<ReservedVoucher, VouchersServiceError>;

    /// Hand back one use. Saturates at zero.
    async fn release_voucher(&self, voucher: VoucherUuid)
    -> Result<VoucherRecord, VouchersServiceError>;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jiff::SignedDuration;
    use smallvec::smallvec;
    use testresult::TestResult;

    use crate::{
        domain::{
            parties::{CustomerUuid, StallUuid},
            vouchers::{eligibility::IneligibleReason, records::Targeting},
        },
        test::{TestContext, helpers},
    };

    use super::*;

    fn cart(subtotal: u64) -> Cart {
        Cart {
            stall: StallUuid::new(),
            subtotal,
        }
    }

    #[tokio::test]
    async fn create_voucher_normalizes_code_and_starts_unused() -> TestResult {
        let ctx = TestContext::new();

        let voucher = ctx
            .vouchers
            .create_voucher(helpers::new_voucher(&ctx, " welcome20 "))
            .await?;

        assert_eq!(voucher.code, "WELCOME20");
        assert_eq!(voucher.usage_count, 0);

        let found = ctx
            .vouchers
            .find_voucher_by_code("Welcome20".to_owned())
            .await?;

        assert_eq!(found.uuid, voucher.uuid);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_codes_are_rejected_case_insensitively() -> TestResult {
        let ctx = TestContext::new();

        ctx.vouchers
            .create_voucher(helpers::new_voucher(&ctx, "LUNCH"))
            .await?;

        let result = ctx
            .vouchers
            .create_voucher(helpers::new_voucher(&ctx, "lunch"))
            .await;

        assert!(
            matches!(result, Err(VouchersServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_voucher_rejects_out_of_range_percentage() {
        let ctx = TestContext::new();

        let voucher = NewVoucher {
            discount: VoucherDiscount::PercentageOff {
                percentage: 120,
                max_discount: None,
            },
            ..helpers::new_voucher(&ctx, "HALF")
        };

        let result = ctx.vouchers.create_voucher(voucher).await;

        assert!(
            matches!(result, Err(VouchersServiceError::InvalidData(_))),
            "expected InvalidData, got {result:?}"
        );
    }

    #[tokio::test]
    async fn preview_returns_discount_and_current_usage() -> TestResult {
        let ctx = TestContext::new();
        let voucher = ctx
            .vouchers
            .create_voucher(helpers::new_voucher(&ctx, "SAVE"))
            .await?;

        helpers::reserve(&ctx, voucher.uuid, 0).await?;

        let preview = ctx
            .vouchers
            .preview_discount("save".to_owned(), helpers::customer(), cart(15_000))
            .await?;

        assert_eq!(preview.voucher, voucher.uuid);
        assert_eq!(preview.usage_count, 1);
        assert_eq!(preview.discount, 2_000);

        Ok(())
    }

    #[tokio::test]
    async fn preview_reports_why_a_voucher_does_not_apply() -> TestResult {
        let ctx = TestContext::new();

        ctx.vouchers
            .create_voucher(helpers::new_voucher(&ctx, "BIGSPENDER"))
            .await?;

        let result = ctx
            .vouchers
            .preview_discount("BIGSPENDER".to_owned(), helpers::customer(), cart(500))
            .await;

        assert!(
            matches!(
                result,
                Err(VouchersServiceError::NotRedeemable(
                    IneligibleReason::MinimumOrderNotMet { minimum: 10_000 }
                ))
            ),
            "expected MinimumOrderNotMet, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_available_vouchers_skips_ineligible_ones() -> TestResult {
        let ctx = TestContext::new();
        let customer = helpers::customer();

        let open = ctx
            .vouchers
            .create_voucher(helpers::new_voucher(&ctx, "OPEN"))
            .await?;

        ctx.vouchers
            .create_voucher(NewVoucher {
                user_targeting: Targeting::Selected(smallvec!["someone@else.edu".to_owned()]),
                ..helpers::new_voucher(&ctx, "PRIVATE")
            })
            .await?;

        ctx.vouchers
            .create_voucher(NewVoucher {
                is_active: false,
                ..helpers::new_voucher(&ctx, "PAUSED")
            })
            .await?;

        let available = ctx
            .vouchers
            .list_available_vouchers(customer, cart(15_000))
            .await?;

        let codes: Vec<&str> = available.iter().map(|a| a.voucher.code.as_str()).collect();

        assert_eq!(codes, vec![open.code.as_str()]);

        Ok(())
    }

    #[tokio::test]
    async fn reserve_increments_usage_count() -> TestResult {
        let ctx = TestContext::new();
        let voucher = ctx
            .vouchers
            .create_voucher(helpers::new_voucher(&ctx, "ONCE"))
            .await?;

        let reserved = helpers::reserve(&ctx, voucher.uuid, 0).await?;

        assert_eq!(reserved.voucher.usage_count, 1);
        assert_eq!(reserved.discount, 2_000);

        Ok(())
    }

    #[tokio::test]
    async fn reserve_with_stale_expectation_rereads_and_succeeds() -> TestResult {
        let ctx = TestContext::new();
        let voucher = ctx
            .vouchers
            .create_voucher(helpers::new_voucher(&ctx, "STALE"))
            .await?;

        helpers::reserve(&ctx, voucher.uuid, 0).await?;

        let reserved = helpers::reserve(&ctx, voucher.uuid, 0).await?;

        assert_eq!(reserved.voucher.usage_count, 2);

        Ok(())
    }

    #[tokio::test]
    async fn reserve_exhausted_voucher_fails_without_writing() -> TestResult {
        let ctx = TestContext::new();
        let voucher = ctx
            .vouchers
            .create_voucher(NewVoucher {
                max_usage: 1,
                ..helpers::new_voucher(&ctx, "LAST")
            })
            .await?;

        helpers::reserve(&ctx, voucher.uuid, 0).await?;

        let result = helpers::reserve(&ctx, voucher.uuid, 1).await;

        assert!(
            matches!(result, Err(VouchersServiceError::Exhausted)),
            "expected Exhausted, got {result:?}"
        );

        let stored = ctx.vouchers.get_voucher(voucher.uuid).await?;

        assert_eq!(stored.usage_count, 1);

        Ok(())
    }

    #[tokio::test]
    async fn reserve_rejects_expired_voucher() -> TestResult {
        let ctx = TestContext::new();
        let voucher = ctx
            .vouchers
            .create_voucher(helpers::new_voucher(&ctx, "SUMMER"))
            .await?;

        ctx.clock.advance(SignedDuration::from_hours(24 * 31));

        let result = helpers::reserve(&ctx, voucher.uuid, 0).await;

        assert!(
            matches!(
                result,
                Err(VouchersServiceError::NotRedeemable(IneligibleReason::Expired))
            ),
            "expected Expired, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn reserve_unknown_voucher_is_not_found() {
        let ctx = TestContext::new();

        let result = helpers::reserve(&ctx, VoucherUuid::new(), 0).await;

        assert!(
            matches!(result, Err(VouchersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn reserve_refuses_a_customer_the_voucher_is_not_targeted_at() -> TestResult {
        let ctx = TestContext::new();
        let owner = Customer::new(CustomerUuid::new(), "owner@campus.edu");
        let stranger = Customer::new(CustomerUuid::new(), "stranger@campus.edu");

        let voucher = ctx
            .vouchers
            .create_voucher(NewVoucher {
                max_usage: 1,
                user_targeting: Targeting::Selected(smallvec!["owner@campus.edu".to_owned()]),
                ..helpers::new_voucher(&ctx, "PTS-OWNER")
            })
            .await?;

        let result = ctx
            .vouchers
            .reserve_voucher(voucher.uuid, 0, stranger, cart(15_000))
            .await;

        assert!(
            matches!(
                result,
                Err(VouchersServiceError::NotRedeemable(
                    IneligibleReason::UserNotTargeted
                ))
            ),
            "expected UserNotTargeted, got {result:?}"
        );
        assert_eq!(ctx.vouchers.get_voucher(voucher.uuid).await?.usage_count, 0);

        let reserved = ctx
            .vouchers
            .reserve_voucher(voucher.uuid, 0, owner, cart(15_000))
            .await?;

        assert_eq!(reserved.voucher.usage_count, 1);

        Ok(())
    }

    #[tokio::test]
    async fn reserve_checks_the_cart_it_is_taken_for() -> TestResult {
        let ctx = TestContext::new();
        let stall = StallUuid::new();

        let voucher = ctx
            .vouchers
            .create_voucher(NewVoucher {
                stall_targeting: Targeting::Selected(smallvec![stall]),
                ..helpers::new_voucher(&ctx, "STALLONLY")
            })
            .await?;

        let elsewhere = ctx
            .vouchers
            .reserve_voucher(voucher.uuid, 0, helpers::customer(), cart(15_000))
            .await;

        assert!(
            matches!(
                elsewhere,
                Err(VouchersServiceError::NotRedeemable(
                    IneligibleReason::StallNotTargeted
                ))
            ),
            "expected StallNotTargeted, got {elsewhere:?}"
        );

        let too_small = ctx
            .vouchers
            .reserve_voucher(
                voucher.uuid,
                0,
                helpers::customer(),
                Cart {
                    stall,
                    subtotal: 500,
                },
            )
            .await;

        assert!(
            matches!(
                too_small,
                Err(VouchersServiceError::NotRedeemable(
                    IneligibleReason::MinimumOrderNotMet { minimum: 10_000 }
                ))
            ),
            "expected MinimumOrderNotMet, got {too_small:?}"
        );
        assert_eq!(ctx.vouchers.get_voucher(voucher.uuid).await?.usage_count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn release_decrements_and_saturates_at_zero() -> TestResult {
        let ctx = TestContext::new();
        let voucher = ctx
            .vouchers
            .create_voucher(helpers::new_voucher(&ctx, "BACK"))
            .await?;

        helpers::reserve(&ctx, voucher.uuid, 0).await?;

        let released = ctx.vouchers.release_voucher(voucher.uuid).await?;

        assert_eq!(released.usage_count, 0);

        let again = ctx.vouchers.release_voucher(voucher.uuid).await?;

        assert_eq!(again.usage_count, 0);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_for_the_last_use_has_exactly_one_winner() -> TestResult {
        let ctx = TestContext::new();
        let voucher = ctx
            .vouchers
            .create_voucher(NewVoucher {
                max_usage: 1,
                ..helpers::new_voucher(&ctx, "RACE")
            })
            .await?;

        let vouchers = Arc::new(ctx.vouchers.clone());

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let vouchers = Arc::clone(&vouchers);

                tokio::spawn(async move {
                    vouchers
                        .reserve_voucher(voucher.uuid, 0, helpers::customer(), cart(15_000))
                        .await
                })
            })
            .collect();

        let mut reserved = 0;
        let mut exhausted = 0;

        for handle in handles {
            match handle.await? {
                Ok(_) => reserved += 1,
                Err(VouchersServiceError::Exhausted) => exhausted += 1,
                Err(error) => return Err(error.into()),
            }
        }

        assert_eq!((reserved, exhausted), (1, 1));
        assert_eq!(ctx.vouchers.get_voucher(voucher.uuid).await?.usage_count, 1);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn usage_never_exceeds_max_under_contention() -> TestResult {
        let ctx = TestContext::new();
        let voucher = ctx
            .vouchers
            .create_voucher(NewVoucher {
                max_usage: 5,
                ..helpers::new_voucher(&ctx, "CROWD")
            })
            .await?;

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let vouchers = ctx.vouchers.clone();

                tokio::spawn(async move {
                    let current = vouchers.get_voucher(voucher.uuid).await?;

                    vouchers
                        .reserve_voucher(
                            voucher.uuid,
                            current.usage_count,
                            helpers::customer(),
                            cart(15_000),
                        )
                        .await
                })
            })
            .collect();

        let mut reserved = 0_u64;

        for handle in handles {
            match handle.await? {
                Ok(_) => reserved += 1,
                Err(VouchersServiceError::Exhausted | VouchersServiceError::RetryExhausted) => {}
                Err(error) => return Err(error.into()),
            }
        }

        let stored = ctx.vouchers.get_voucher(voucher.uuid).await?;

        assert!(stored.usage_count <= stored.max_usage);
        assert_eq!(stored.usage_count, reserved);

        Ok(())
    }

    #[tokio::test]
    async fn targeted_customer_match_ignores_case() -> TestResult {
        let ctx = TestContext::new();
        let customer = Customer::new(CustomerUuid::new(), "Ana@Campus.EDU");

        ctx.vouchers
            .create_voucher(NewVoucher {
                user_targeting: Targeting::Selected(smallvec!["ana@campus.edu".to_owned()]),
                ..helpers::new_voucher(&ctx, "ANA")
            })
            .await?;

        let preview = ctx
            .vouchers
            .preview_discount("ANA".to_owned(), customer, cart(15_000))
            .await?;

        assert_eq!(preview.discount, 2_000);

        Ok(())
    }
}
