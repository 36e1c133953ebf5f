//! Payments Service
//!
//! Every mutation reads the payment, normalizes it against the clock and then
//! writes conditioned on the version it read. A payment found past its
//! deadline is written as `EXPIRED` first; whichever request wins that write
//! also triggers the voucher release policy.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use tracing::{Span, error, info, warn};

use crate::{
    clock::Clock,
    config::{LedgerSettings, VoucherReleasePolicy},
    domain::{
        loyalty::LoyaltyService,
        orders::{
            OrdersServiceError, StoreOrdersService,
            records::{OrderRecord, OrderUuid, ReservationState},
        },
        parties::StaffId,
        payments::{
            PaymentsServiceError,
            data::{CreatedPayment, PaymentOutcome, Viewer},
            instructions::PaymentInstructions,
            phone::GcashNumber,
            records::{PaymentRecord, PaymentUuid},
            reference_number::GcashReferenceNumber,
            repository::PaymentsRepository,
            state::PaymentStatus,
        },
        references::{self, PAYMENT_REFERENCE_PREFIX},
    },
    store::{StoreError, Versioned},
};

enum Step {
    Unchanged,
    Write(PaymentRecord),
}

/// Whether `status -> to` should be written. Terminal payments are left alone
/// rather than reported as errors.
fn guard(status: PaymentStatus, to: PaymentStatus) -> Result<bool, PaymentsServiceError> {
    if status.can_transition_to(to) {
        Ok(true)
    } else if status.is_terminal() {
        Ok(false)
    } else {
        Err(PaymentsServiceError::WrongState { status })
    }
}

#[derive(Clone)]
pub struct StorePaymentsService {
    repository: PaymentsRepository,
    orders: StoreOrdersService,
    loyalty: Arc<dyn LoyaltyService>,
    clock: Arc<dyn Clock>,
    max_attempts: u32,
    payment_ttl: SignedDuration,
    release_policy: VoucherReleasePolicy,
}

impl Debug for StorePaymentsService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("StorePaymentsService")
            .field("repository", &self.repository)
            .field("orders", &self.orders)
            .field("max_attempts", &self.max_attempts)
            .field("payment_ttl", &self.payment_ttl)
            .field("release_policy", &self.release_policy)
            .finish_non_exhaustive()
    }
}

impl StorePaymentsService {
    #[must_use]
    pub fn new(
        store: &Arc<dyn crate::store::DocumentStore>,
        orders: StoreOrdersService,
        loyalty: Arc<dyn LoyaltyService>,
        clock: Arc<dyn Clock>,
        settings: &LedgerSettings,
    ) -> Self {
        Self {
            repository: PaymentsRepository::new(store),
            orders,
            loyalty,
            clock,
            max_attempts: settings.attempts(),
            payment_ttl: settings.payment_ttl,
            release_policy: settings.release_policy,
        }
    }

    async fn transition<F>(
        &self,
        payment: PaymentUuid,
        mut apply: F,
    ) -> Result<PaymentOutcome, PaymentsServiceError>
    where
        F: FnMut(&PaymentRecord, Timestamp) -> Result<Step, PaymentsServiceError> + Send,
    {
        for attempt in 1..=self.max_attempts {
            let Versioned { version, record } = self.repository.get(payment).await?;
            let now = self.clock.now();

            if record.is_due_to_expire(now) {
                let expired = PaymentRecord {
                    status: PaymentStatus::Expired,
                    updated_at: now,
                    ..record
                };

                match self.repository.replace(version, expired).await {
                    Ok(expired) => {
                        info!(payment_uuid = %payment, "payment expired");

                        self.after_termination(&expired.record).await;

                        return Ok(PaymentOutcome::Unchanged(expired.record));
                    }
                    Err(StoreError::Conflict) => {
                        warn!(attempt, payment_uuid = %payment, "payment expiry conflicted, retrying");

                        continue;
                    }
                    Err(error) => return Err(error.into()),
                }
            }

            let next = match apply(&record, now)? {
                Step::Unchanged => return Ok(PaymentOutcome::Unchanged(record)),
                Step::Write(next) => next,
            };

            match self.repository.replace(version, next).await {
                Ok(updated) => {
                    info!(
                        payment_uuid = %payment,
                        from = %record.status,
                        to = %updated.record.status,
                        "payment transitioned"
                    );

                    return Ok(PaymentOutcome::Transitioned(updated.record));
                }
                Err(StoreError::Conflict) => {
                    warn!(attempt, payment_uuid = %payment, "payment update conflicted, retrying");
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(PaymentsServiceError::RetryExhausted)
    }

    /// Release the order's voucher use when the policy says a failed or
    /// expired payment gives it back.
    async fn after_termination(&self, payment: &PaymentRecord) {
        if !self.release_policy.releases_on_payment_termination() {
            return;
        }

        if let Err(error) = self
            .orders
            .settle_voucher(payment.order, ReservationState::Released)
            .await
        {
            error!(%error, order_uuid = %payment.order, "failed to release voucher for terminated payment");
        }
    }

    /// Commit the order's voucher use and credit loyalty points.
    async fn after_completion(&self, payment: &PaymentRecord) {
        if let Err(error) = self
            .orders
            .settle_voucher(payment.order, ReservationState::Committed)
            .await
        {
            error!(%error, order_uuid = %payment.order, "failed to commit voucher for completed payment");
        }

        let points = self.loyalty.points_for_order(payment.amount);

        if points == 0 {
            return;
        }

        let order = match self.orders.repository().get(payment.order).await {
            Ok(order) => order.record,
            Err(error) => {
                error!(%error, order_uuid = %payment.order, "failed to load order for loyalty credit");

                return;
            }
        };

        if let Err(error) = self
            .loyalty
            .earn_points(order.customer(), points, format!("Order {}", order.uuid))
            .await
        {
            error!(%error, order_uuid = %order.uuid, "failed to credit loyalty points");
        }
    }

    /// Whether `payment` still holds its order's payment slot.
    async fn is_open(&self, payment: PaymentUuid, now: Timestamp) -> Result<bool, PaymentsServiceError> {
        let open = self
            .repository
            .find(payment)
            .await?
            .is_some_and(|payment| !payment.record.effective_status(now).is_terminal());

        Ok(open)
    }

    async fn load_order(&self, order: OrderUuid) -> Result<Versioned<OrderRecord>, PaymentsServiceError> {
        self.orders
            .repository()
            .get(order)
            .await
            .map_err(|error| match error {
                StoreError::NotFound => PaymentsServiceError::OrderNotFound,
                error => PaymentsServiceError::Store(error),
            })
    }

    /// Refuse `payment` for a closed order, or for one whose slot another open
    /// payment holds.
    async fn ensure_slot_free(
        &self,
        order: &OrderRecord,
        payment: PaymentUuid,
        now: Timestamp,
    ) -> Result<(), PaymentsServiceError> {
        if order.status.is_terminal() {
            return Err(PaymentsServiceError::OrderClosed {
                status: order.status,
            });
        }

        if let Some(active) = order.active_payment
            && active != payment
            && self.is_open(active, now).await?
        {
            return Err(PaymentsServiceError::ActivePaymentExists { payment: active });
        }

        Ok(())
    }

    /// Point the order's payment slot at `payment`, which must already be
    /// stored, provided no other open payment holds it.
    async fn claim_order_slot(
        &self,
        order: OrderUuid,
        payment: PaymentUuid,
    ) -> Result<OrderRecord, PaymentsServiceError> {
        for attempt in 1..=self.max_attempts {
            let Versioned { version, record } = self.load_order(order).await?;
            let now = self.clock.now();

            self.ensure_slot_free(&record, payment, now).await?;

            if record.active_payment == Some(payment) {
                return Ok(record);
            }

            let next = OrderRecord {
                active_payment: Some(payment),
                updated_at: now,
                ..record
            };

            match self.orders.repository().replace(version, next).await {
                Ok(updated) => return Ok(updated.record),
                Err(StoreError::Conflict) => {
                    warn!(attempt, order_uuid = %order, "order payment slot conflicted, retrying");
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(PaymentsServiceError::RetryExhausted)
    }

    /// Fail a payment that never got its order's slot. The order's voucher
    /// belongs to whichever payment holds the slot, so it is not touched.
    async fn abandon(&self, payment: Versioned<PaymentRecord>, reason: &PaymentsServiceError) {
        let now = self.clock.now();
        let uuid = payment.record.uuid;

        let failed = PaymentRecord {
            status: PaymentStatus::Failed,
            cancelled_at: Some(now),
            cancellation_reason: Some(reason.to_string()),
            updated_at: now,
            ..payment.record
        };

        if let Err(error) = self.repository.replace(payment.version, failed).await {
            error!(%error, payment_uuid = %uuid, "failed to close a payment that lost its order slot");
        }
    }
}

#[async_trait]
impl PaymentsService for StorePaymentsService {
    #[tracing::instrument(
        name = "payments.service.create_payment",
        skip(self, stall_gcash_number),
        fields(order_uuid = %order, payment_uuid = tracing::field::Empty),
        err
    )]
    async fn create_payment(
        &self,
        order: OrderUuid,
        stall_gcash_number: String,
    ) -> Result<CreatedPayment, PaymentsServiceError> {
        let stall_number = GcashNumber::parse(&stall_gcash_number)?;
        let payment_uuid = PaymentUuid::new();

        Span::current().record("payment_uuid", tracing::field::display(payment_uuid));

        let Versioned { record: order, .. } = self.load_order(order).await?;
        let now = self.clock.now();

        self.ensure_slot_free(&order, payment_uuid, now).await?;

        let reference_code = references::claim_generated_code(
            self.repository.references(),
            PAYMENT_REFERENCE_PREFIX,
            payment_uuid.to_string(),
            now,
            self.max_attempts,
        )
        .await?;

        let payment = PaymentRecord {
            uuid: payment_uuid,
            order: order.uuid,
            customer: order.customer,
            stall: order.stall,
            stall_gcash_number: stall_number.to_string(),
            amount: order.total,
            reference_code,
            status: PaymentStatus::Pending,
            customer_gcash_number: None,
            gcash_reference_number: None,
            created_at: now,
            expires_at: now.checked_add(self.payment_ttl).unwrap_or(Timestamp::MAX),
            verified_at: None,
            verified_by: None,
            completed_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            refunded_at: None,
            refunded_by: None,
            updated_at: now,
        };

        let created = self.repository.insert(payment).await?;

        if let Err(error) = self.claim_order_slot(order.uuid, payment_uuid).await {
            warn!(%error, "payment lost the order slot");

            self.abandon(created, &error).await;

            return Err(error);
        }

        info!(
            amount = created.record.amount,
            reference_code = %created.record.reference_code,
            "created payment"
        );

        Ok(CreatedPayment {
            instructions: PaymentInstructions::for_payment(&created.record),
            payment: created.record,
        })
    }

    #[tracing::instrument(
        name = "payments.service.get_payment",
        skip(self, viewer),
        fields(payment_uuid = %payment),
        err
    )]
    async fn get_payment(
        &self,
        payment: PaymentUuid,
        viewer: Viewer,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let payment = self.repository.get(payment).await?.record;

        Ok(payment.view_for(&viewer, self.clock.now()))
    }

    #[tracing::instrument(
        name = "payments.service.submit_payment_reference",
        skip(self, reference_number, customer_number),
        fields(payment_uuid = %payment),
        err
    )]
    async fn submit_payment_reference(
        &self,
        payment: PaymentUuid,
        reference_number: String,
        customer_number: Option<String>,
    ) -> Result<PaymentOutcome, PaymentsServiceError> {
        let reference_number = GcashReferenceNumber::parse(&reference_number)?;
        let customer_number = customer_number
            .as_deref()
            .map(GcashNumber::parse)
            .transpose()?;

        self.transition(payment, |record, now| {
            if !guard(record.status, PaymentStatus::AwaitingVerification)? {
                return Ok(Step::Unchanged);
            }

            Ok(Step::Write(PaymentRecord {
                status: PaymentStatus::AwaitingVerification,
                gcash_reference_number: Some(reference_number.to_string()),
                customer_gcash_number: customer_number.as_ref().map(ToString::to_string),
                updated_at: now,
                ..record.clone()
            }))
        })
        .await
    }

    #[tracing::instrument(
        name = "payments.service.verify_payment",
        skip(self),
        fields(payment_uuid = %payment, staff_id = %staff),
        err
    )]
    async fn verify_payment(
        &self,
        payment: PaymentUuid,
        observed_amount: u64,
        staff: StaffId,
    ) -> Result<PaymentOutcome, PaymentsServiceError> {
        self.transition(payment, |record, now| {
            if !guard(record.status, PaymentStatus::Verified)? {
                return Ok(Step::Unchanged);
            }

            if observed_amount != record.amount {
                return Err(PaymentsServiceError::AmountMismatch {
                    expected: record.amount,
                    observed: observed_amount,
                });
            }

            Ok(Step::Write(PaymentRecord {
                status: PaymentStatus::Verified,
                verified_at: Some(now),
                verified_by: Some(staff.clone()),
                updated_at: now,
                ..record.clone()
            }))
        })
        .await
    }

    #[tracing::instrument(
        name = "payments.service.complete_payment",
        skip(self),
        fields(payment_uuid = %payment),
        err
    )]
    async fn complete_payment(
        &self,
        payment: PaymentUuid,
    ) -> Result<PaymentOutcome, PaymentsServiceError> {
        let outcome = self
            .transition(payment, |record, now| {
                if !guard(record.status, PaymentStatus::Completed)? {
                    return Ok(Step::Unchanged);
                }

                Ok(Step::Write(PaymentRecord {
                    status: PaymentStatus::Completed,
                    completed_at: Some(now),
                    updated_at: now,
                    ..record.clone()
                }))
            })
            .await?;

        if let PaymentOutcome::Transitioned(completed) = &outcome {
            self.after_completion(completed).await;
        }

        Ok(outcome)
    }

    #[tracing::instrument(
        name = "payments.service.cancel_payment",
        skip(self),
        fields(payment_uuid = %payment),
        err
    )]
    async fn cancel_payment(
        &self,
        payment: PaymentUuid,
        reason: String,
    ) -> Result<PaymentOutcome, PaymentsServiceError> {
        let outcome = self
            .transition(payment, |record, now| {
                if !guard(record.status, PaymentStatus::Failed)? {
                    return Ok(Step::Unchanged);
                }

                Ok(Step::Write(PaymentRecord {
                    status: PaymentStatus::Failed,
                    cancelled_at: Some(now),
                    cancellation_reason: Some(reason.clone()),
                    updated_at: now,
                    ..record.clone()
                }))
            })
            .await?;

        if let PaymentOutcome::Transitioned(failed) = &outcome {
            self.after_termination(failed).await;
        }

        Ok(outcome)
    }

    #[tracing::instrument(
        name = "payments.service.refund_payment",
        skip(self),
        fields(payment_uuid = %payment, admin_id = %admin),
        err
    )]
    async fn refund_payment(
        &self,
        payment: PaymentUuid,
        admin: StaffId,
    ) -> Result<PaymentOutcome, PaymentsServiceError> {
        self.transition(payment, |record, now| {
            if !guard(record.status, PaymentStatus::Refunded)? {
                return Ok(Step::Unchanged);
            }

            Ok(Step::Write(PaymentRecord {
                status: PaymentStatus::Refunded,
                refunded_at: Some(now),
                refunded_by: Some(admin.clone()),
                updated_at: now,
                ..record.clone()
            }))
        })
        .await
    }

    #[tracing::instrument(
        name = "payments.service.expire_payment",
        skip(self),
        fields(payment_uuid = %payment),
        err
    )]
    async fn expire_payment(
        &self,
        payment: PaymentUuid,
    ) -> Result<PaymentOutcome, PaymentsServiceError> {
        self.transition(payment, |_record, _now| Ok(Step::Unchanged))
            .await
    }
}

impl From<OrdersServiceError> for PaymentsServiceError {
    fn from(error: OrdersServiceError) -> Self {
        Self::Order(error)
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Open a payment for an order's total, claiming the order's payment slot.
    async fn create_payment(
        &self,
        order: OrderUuid,
        stall_gcash_number: String,
    ) -> Result<CreatedPayment, PaymentsServiceError>;

    /// Retrieve a payment with its status as of now.
    async fn get_payment(
        &self,
        payment: PaymentUuid,
        viewer: Viewer,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Record the customer's GCash receipt reference number.
    async fn submit_payment_reference(
        &self,
        payment: PaymentUuid,
        reference_number: String,
        customer_number: Option<String>,
    ) -> Result<PaymentOutcome, PaymentsServiceError>;

    /// Staff confirm the transfer arrived for exactly the payment amount.
    async fn verify_payment(
        &self,
        payment: PaymentUuid,
        observed_amount: u64,
        staff: StaffId,
    ) -> Result<PaymentOutcome, PaymentsServiceError>;

    /// Close a verified payment, committing the order's voucher use.
    async fn complete_payment(
        &self,
        payment: PaymentUuid,
    ) -> Result<PaymentOutcome, PaymentsServiceError>;

    /// Abandon a payment that has not been verified.
    async fn cancel_payment(
        &self,
        payment: PaymentUuid,
        reason: String,
    ) -> Result<PaymentOutcome, PaymentsServiceError>;

    /// Administrative refund of a completed payment.
    async fn refund_payment(
        &self,
        payment: PaymentUuid,
        admin: StaffId,
    ) -> Result<PaymentOutcome, PaymentsServiceError>;

    /// Write `EXPIRED` for a payment past its deadline.
    async fn expire_payment(
        &self,
        payment: PaymentUuid,
    ) -> Result<PaymentOutcome, PaymentsServiceError>;
}
