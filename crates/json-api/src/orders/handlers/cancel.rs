//! Cancel Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{get::OrderResponse, handlers::authorize, into_status_error},
    state::State,
};

/// Cancel Order Handler
///
/// Cancels an open order and hands back its reserved voucher use.
#[endpoint(
    tags("orders"),
    summary = "Cancel Order",
    responses(
        (status_code = StatusCode::OK, description = "Order cancelled"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order is already closed"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Identity required"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let order = order.into_inner().into();

    let existing = state
        .app
        .orders
        .get_order(order)
        .await
        .map_err(into_status_error)?;

    authorize(&depot.caller(), &existing)?;

    let cancelled = state
        .app
        .orders
        .cancel_order(order)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cancelled.into()))
}
