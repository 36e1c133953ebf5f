//! Get Order Handler

use std::{string::ToString, sync::Arc};

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use canteen_app::domain::orders::records::{AppliedVoucher, OrderRecord, ReservationState};

use crate::{
    extensions::*,
    orders::{handlers::authorize, into_status_error},
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AppliedVoucherResponse {
    pub voucher: Uuid,

    pub code: String,

    /// Discount in centavos
    pub discount: u64,

    /// `reserved`, `committed` or `released`
    pub state: String,
}

impl From<AppliedVoucher> for AppliedVoucherResponse {
    fn from(applied: AppliedVoucher) -> Self {
        Self {
            voucher: applied.voucher.into(),
            code: applied.code,
            discount: applied.discount,
            state: match applied.state {
                ReservationState::Reserved => "reserved",
                ReservationState::Committed => "committed",
                ReservationState::Released => "released",
            }
            .to_owned(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,

    pub customer: Uuid,

    pub stall: Uuid,

    /// `pending`, `preparing`, `ready`, `completed` or `cancelled`
    pub status: String,

    /// Subtotal in centavos
    pub subtotal: u64,

    /// Amount due after any voucher discount
    pub total: u64,

    pub applied_voucher: Option<AppliedVoucherResponse>,

    /// Payload to render into the pickup QR code
    pub qr_token: String,

    pub active_payment: Option<Uuid>,

    pub created_at: String,

    pub updated_at: String,

    pub completed_at: Option<String>,

    pub cancelled_at: Option<String>,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        Self {
            uuid: order.uuid.into(),
            customer: order.customer.into(),
            stall: order.stall.into(),
            status: order.status.to_string(),
            subtotal: order.subtotal,
            total: order.total,
            applied_voucher: order.applied_voucher.map(Into::into),
            qr_token: order.qr_token,
            active_payment: order.active_payment.map(Into::into),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
            completed_at: order.completed_at.as_ref().map(ToString::to_string),
            cancelled_at: order.cancelled_at.as_ref().map(ToString::to_string),
        }
    }
}

/// Get Order Handler
///
/// Returns an order to its customer or to staff.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    responses(
        (status_code = StatusCode::OK, description = "Order found"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Identity required"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let order = state
        .app
        .orders
        .get_order(order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    authorize(&depot.caller(), &order)?;

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use canteen_app::domain::{
        orders::{OrdersServiceError, records::OrderUuid},
        parties::CustomerUuid,
    };

    use crate::test_helpers::{Mocks, as_customer, as_staff, make_order, service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service(mocks, Router::with_path("orders/{order}").get(handler))
    }

    fn returning(order: OrderRecord) -> Mocks {
        let uuid = order.uuid;
        let mut mocks = Mocks::default();

        mocks
            .orders
            .expect_get_order()
            .once()
            .withf(move |requested| *requested == uuid)
            .return_once(move |_| Ok(order));

        mocks
    }

    #[tokio::test]
    async fn test_get_order_as_owner() -> TestResult {
        let uuid = OrderUuid::new();

        let mut res = as_customer(TestClient::get(format!("http://example.com/orders/{uuid}")))
            .send(&make_service(returning(make_order(uuid))))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, uuid.into_uuid());
        assert_eq!(body.status, "pending");
        assert_eq!(body.total, 15_000);
        assert!(body.qr_token.contains(&uuid.to_string()));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_order_as_staff() {
        let uuid = OrderUuid::new();

        let res = as_staff(TestClient::get(format!("http://example.com/orders/{uuid}")))
            .send(&make_service(returning(make_order(uuid))))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_get_someone_elses_order_returns_404() {
        let uuid = OrderUuid::new();
        let mut order = make_order(uuid);
        order.customer = CustomerUuid::new();

        let res = as_customer(TestClient::get(format!("http://example.com/orders/{uuid}")))
            .send(&make_service(returning(order)))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_get_missing_order_returns_404() {
        let mut mocks = Mocks::default();

        mocks
            .orders
            .expect_get_order()
            .once()
            .return_once(|_| Err(OrdersServiceError::NotFound));

        let res = as_staff(TestClient::get(format!(
            "http://example.com/orders/{}",
            OrderUuid::new()
        )))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }
}
