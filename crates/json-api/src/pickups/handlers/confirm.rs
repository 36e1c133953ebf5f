//! Confirm Pickup Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    extensions::*,
    orders::{self, get::OrderResponse},
    state::State,
};

/// Confirm Pickup Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ConfirmPickupRequest {
    /// The QR payload as scanned or pasted, or an order id typed by hand
    pub scan: String,
}

/// Confirm Pickup Handler
///
/// Staff only. Completes a ready order. A second scan of the same order is
/// refused.
#[endpoint(
    tags("pickups"),
    summary = "Confirm Pickup",
    responses(
        (status_code = StatusCode::OK, description = "Order picked up"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unreadable scan"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order not ready or already picked up"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Staff identity required"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ConfirmPickupRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.staff_or_401()?;

    let order = state
        .app
        .orders
        .confirm_pickup(json.into_inner().scan)
        .await
        .map_err(orders::into_status_error)?;

    Ok(Json(order.into()))
}
