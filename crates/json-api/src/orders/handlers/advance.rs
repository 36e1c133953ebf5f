//! Advance Order Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use canteen_app::domain::orders::records::OrderStatus;

use crate::{
    extensions::*,
    orders::{get::OrderResponse, into_status_error},
    state::State,
};

/// Kitchen step staff can move an order to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum KitchenStatus {
    Preparing,
    Ready,
}

impl From<KitchenStatus> for OrderStatus {
    fn from(status: KitchenStatus) -> Self {
        match status {
            KitchenStatus::Preparing => OrderStatus::Preparing,
            KitchenStatus::Ready => OrderStatus::Ready,
        }
    }
}

/// Advance Order Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AdvanceOrderRequest {
    pub status: KitchenStatus,
}

/// Advance Order Handler
///
/// Staff only. Moves an order one kitchen step forward.
#[endpoint(
    tags("orders"),
    summary = "Advance Order",
    responses(
        (status_code = StatusCode::OK, description = "Order advanced"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order cannot move to that status"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Staff identity required"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<AdvanceOrderRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.staff_or_401()?;

    let order = state
        .app
        .orders
        .advance_order(order.into_inner().into(), json.into_inner().status.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}
