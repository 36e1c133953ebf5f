//! Orders Service

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{Span, error, info, warn};

use crate::{
    clock::Clock,
    domain::{
        orders::{
            OrdersServiceError,
            data::{NewOrder, OrderVoucher},
            pickup::{self, PickupToken},
            records::{AppliedVoucher, OrderRecord, OrderStatus, OrderUuid, ReservationState},
            repository::OrdersRepository,
        },
        vouchers::{VouchersService, data::Cart},
    },
    store::{DocumentStore, StoreError, Versioned},
};

/// What a conditional order update decided to do with the current record.
pub(crate) enum OrderChange {
    Unchanged,
    Write(OrderRecord),
}

/// Result of [`StoreOrdersService::modify`].
pub(crate) struct Modified {
    pub record: OrderRecord,
    pub written: bool,
}

#[derive(Clone)]
pub struct StoreOrdersService {
    repository: OrdersRepository,
    vouchers: Arc<dyn VouchersService>,
    clock: Arc<dyn Clock>,
    max_attempts: u32,
}

impl Debug for StoreOrdersService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("StoreOrdersService")
            .field("repository", &self.repository)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl StoreOrdersService {
    #[must_use]
    pub fn new(
        store: &Arc<dyn DocumentStore>,
        vouchers: Arc<dyn VouchersService>,
        clock: Arc<dyn Clock>,
        max_attempts: u32,
    ) -> Self {
        Self {
            repository: OrdersRepository::new(store),
            vouchers,
            clock,
            max_attempts: max_attempts.max(1),
        }
    }

    pub(crate) fn repository(&self) -> &OrdersRepository {
        &self.repository
    }

    /// Read-decide-write loop over one order. `change` sees the freshest
    /// record on every attempt.
    pub(crate) async fn modify<F>(
        &self,
        order: OrderUuid,
        mut change: F,
    ) -> Result<Modified, OrdersServiceError>
    where
        F: FnMut(&OrderRecord, Timestamp) -> Result<OrderChange, OrdersServiceError> + Send,
    {
        for attempt in 1..=self.max_attempts {
            let Versioned { version, record } = self.repository.get(order).await?;

            let next = match change(&record, self.clock.now())? {
                OrderChange::Unchanged => {
                    return Ok(Modified {
                        record,
                        written: false,
                    });
                }
                OrderChange::Write(next) => next,
            };

            match self.repository.replace(version, next).await {
                Ok(updated) => {
                    return Ok(Modified {
                        record: updated.record,
                        written: true,
                    });
                }
                Err(StoreError::Conflict) => {
                    warn!(attempt, order_uuid = %order, "order update conflicted, retrying");
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(OrdersServiceError::RetryExhausted)
    }

    /// Move a `reserved` voucher use to `state`. Returns the voucher when this
    /// call made the move; `None` when there was nothing reserved to settle.
    /// Releasing hands the use back to the voucher ledger.
    pub(crate) async fn settle_voucher(
        &self,
        order: OrderUuid,
        state: ReservationState,
    ) -> Result<Option<AppliedVoucher>, OrdersServiceError> {
        let modified = self
            .modify(order, |record, now| {
                let Some(applied) = record
                    .applied_voucher
                    .as_ref()
                    .filter(|applied| applied.state == ReservationState::Reserved)
                else {
                    return Ok(OrderChange::Unchanged);
                };

                let mut next = record.clone();

                next.applied_voucher = Some(AppliedVoucher {
                    state,
                    ..applied.clone()
                });
                next.updated_at = now;

                Ok(OrderChange::Write(next))
            })
            .await?;

        if !modified.written {
            return Ok(None);
        }

        let applied = modified.record.applied_voucher;

        if state == ReservationState::Released
            && let Some(applied) = &applied
        {
            self.vouchers
                .release_voucher(applied.voucher)
                .await
                .map_err(OrdersServiceError::Voucher)?;
        }

        info!(order_uuid = %order, ?state, "settled voucher reservation");

        Ok(applied)
    }
}

#[async_trait]
impl OrdersService for StoreOrdersService {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, order),
        fields(
            order_uuid = %order.uuid,
            customer_uuid = %order.customer.uuid,
            voucher_uuid = tracing::field::Empty
        ),
        err
    )]
    async fn create_order(&self, order: NewOrder) -> Result<OrderRecord, OrdersServiceError> {
        if order.subtotal == 0 {
            return Err(OrdersServiceError::InvalidData("subtotal must be positive"));
        }

        let now = self.clock.now();

        let qr_token = PickupToken::new(order.uuid, now)
            .encode()
            .map_err(|error| OrdersServiceError::Store(StoreError::Serialization(error)))?;

        let applied_voucher = match order.voucher {
            Some(OrderVoucher {
                voucher,
                expected_usage_count,
            }) => {
                Span::current().record("voucher_uuid", tracing::field::display(voucher));

                let cart = Cart {
                    stall: order.stall,
                    subtotal: order.subtotal,
                };

                let reserved = self
                    .vouchers
                    .reserve_voucher(voucher, expected_usage_count, order.customer.clone(), cart)
                    .await
                    .map_err(OrdersServiceError::Voucher)?;

                Some(AppliedVoucher {
                    voucher,
                    code: reserved.voucher.code,
                    discount: reserved.discount,
                    state: ReservationState::Reserved,
                })
            }
            None => None,
        };

        let reserved_voucher = applied_voucher.as_ref().map(|applied| applied.voucher);
        let discount = applied_voucher
            .as_ref()
            .map_or(0, |applied| applied.discount);

        let record = OrderRecord {
            uuid: order.uuid,
            customer: order.customer.uuid,
            customer_email: order.customer.email,
            stall: order.stall,
            qr_token,
            status: OrderStatus::Pending,
            subtotal: order.subtotal,
            total: order.subtotal.saturating_sub(discount),
            applied_voucher,
            active_payment: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
            cancelled_at: None,
        };

        let created = match self.repository.insert(record).await {
            Ok(created) => created,
            Err(error) => {
                if let Some(voucher) = reserved_voucher
                    && let Err(release_error) = self.vouchers.release_voucher(voucher).await
                {
                    error!(
                        error = %release_error,
                        voucher_uuid = %voucher,
                        "order was not stored and its voucher use was not handed back"
                    );
                }

                return Err(error.into());
            }
        };

        info!(total = created.record.total, "created order");

        Ok(created.record)
    }

    #[tracing::instrument(
        name = "orders.service.get_order",
        skip(self),
        fields(order_uuid = %order),
        err
    )]
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        Ok(self.repository.get(order).await?.record)
    }

    #[tracing::instrument(
        name = "orders.service.advance_order",
        skip(self),
        fields(order_uuid = %order, target_status = %target),
        err
    )]
    async fn advance_order(
        &self,
        order: OrderUuid,
        target: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let modified = self
            .modify(order, |record, now| {
                if record.status == target {
                    return Ok(OrderChange::Unchanged);
                }

                if record.status.next_kitchen_step() != Some(target) {
                    return Err(OrdersServiceError::WrongState {
                        status: record.status,
                    });
                }

                Ok(OrderChange::Write(OrderRecord {
                    status: target,
                    updated_at: now,
                    ..record.clone()
                }))
            })
            .await?;

        if modified.written {
            info!("advanced order");
        }

        Ok(modified.record)
    }

    #[tracing::instrument(
        name = "orders.service.cancel_order",
        skip(self),
        fields(order_uuid = %order),
        err
    )]
    async fn cancel_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        let mut released = None;

        let modified = self
            .modify(order, |record, now| {
                if record.status.is_terminal() {
                    return Err(OrdersServiceError::WrongState {
                        status: record.status,
                    });
                }

                let mut next = record.clone();

                next.status = OrderStatus::Cancelled;
                next.cancelled_at = Some(now);
                next.updated_at = now;
                released = None;

                if let Some(applied) = next.applied_voucher.as_mut()
                    && applied.state == ReservationState::Reserved
                {
                    applied.state = ReservationState::Released;
                    released = Some(applied.voucher);
                }

                Ok(OrderChange::Write(next))
            })
            .await?;

        if let Some(voucher) = released
            && let Err(error) = self.vouchers.release_voucher(voucher).await
        {
            error!(
                %error,
                voucher_uuid = %voucher,
                "order cancelled but the voucher use was not handed back"
            );
        }

        info!("cancelled order");

        Ok(modified.record)
    }

    #[tracing::instrument(
        name = "orders.service.confirm_pickup",
        skip(self, scan),
        fields(order_uuid = tracing::field::Empty),
        err
    )]
    async fn confirm_pickup(&self, scan: String) -> Result<OrderRecord, OrdersServiceError> {
        let scan = pickup::decode_scan(&scan)?;
        let order = scan.order();

        Span::current().record("order_uuid", tracing::field::display(order));

        let modified = self
            .modify(order, |record, now| {
                let issued: PickupToken = serde_json::from_str(&record.qr_token)
                    .map_err(|error| OrdersServiceError::Store(StoreError::Serialization(error)))?;

                scan.verify_against(&issued)?;

                match record.status {
                    OrderStatus::Ready => Ok(OrderChange::Write(OrderRecord {
                        status: OrderStatus::Completed,
                        completed_at: Some(now),
                        updated_at: now,
                        ..record.clone()
                    })),
                    OrderStatus::Pending | OrderStatus::Preparing => {
                        Err(OrdersServiceError::NotReady {
                            status: record.status,
                        })
                    }
                    OrderStatus::Completed => Err(OrdersServiceError::AlreadyCompleted),
                    OrderStatus::Cancelled => Err(OrdersServiceError::WrongState {
                        status: record.status,
                    }),
                }
            })
            .await?;

        info!("confirmed pickup");

        Ok(modified.record)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Create an order. A voucher is reserved for this customer and cart as
    /// part of creating it, one use per order.
    async fn create_order(&self, order: NewOrder) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieve a single order.
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// Move an order to its next kitchen step.
    async fn advance_order(
        &self,
        order: OrderUuid,
        target: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Cancel an open order, handing back any reserved voucher use.
    async fn cancel_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// Complete a ready order from a staff scan. Succeeds once per order.
    async fn confirm_pickup(&self, scan: String) -> Result<OrderRecord, OrdersServiceError>;
}
