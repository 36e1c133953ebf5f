//! Create Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use canteen_app::domain::{
    orders::data::{NewOrder, OrderVoucher},
    parties::Customer,
};

use crate::{
    extensions::*,
    orders::{get::OrderResponse, into_status_error},
    state::State,
};

/// Create Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateOrderRequest {
    pub uuid: Uuid,

    pub stall: Uuid,

    /// Subtotal in centavos
    pub subtotal: u64,

    /// A voucher to reserve for this order
    #[serde(default)]
    pub voucher: Option<OrderVoucherRequest>,
}

/// Voucher to apply, as a discount preview reported it
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderVoucherRequest {
    pub uuid: Uuid,

    /// The usage count the preview reported
    pub expected_usage_count: u64,
}

impl CreateOrderRequest {
    fn into_new_order(self, customer: Customer) -> NewOrder {
        NewOrder {
            uuid: self.uuid.into(),
            customer,
            stall: self.stall.into(),
            subtotal: self.subtotal,
            voucher: self.voucher.map(|voucher| OrderVoucher {
                voucher: voucher.uuid.into(),
                expected_usage_count: voucher.expected_usage_count,
            }),
        }
    }
}

/// Create Order Handler
///
/// Reserves one use of the voucher, if any, for this customer and cart.
#[endpoint(
    tags("orders"),
    summary = "Create Order",
    responses(
        (status_code = StatusCode::CREATED, description = "Order created"),
        (status_code = StatusCode::CONFLICT, description = "Order already exists or voucher has no uses left"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Voucher does not apply to this order"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Customer identity required"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let customer = depot.customer_or_401()?;

    let order = state
        .app
        .orders
        .create_order(json.into_inner().into_new_order(customer))
        .await
        .map_err(into_status_error)?;

    res.created_at(format!("/orders/{}", order.uuid))?;

    Ok(Json(order.into()))
}
