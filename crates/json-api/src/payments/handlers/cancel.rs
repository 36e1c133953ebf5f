//! Cancel Payment Handler

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

use crate::{
    extensions::*,
    payments::{PaymentOutcomeResponse, handlers::load_for, into_status_error},
    state::State,
};

/// Cancel Payment Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CancelPaymentRequest {
    pub reason: String,
}

/// Cancel Payment Handler
///
/// The paying customer or staff abandon a payment that has not been
/// verified. The order's payment slot opens up again.
#[endpoint(
    tags("payments"),
    summary = "Cancel Payment",
    responses(
        (status_code = StatusCode::OK, description = "Payment cancelled, or already finished"),
        (status_code = StatusCode::NOT_FOUND, description = "Payment not found"),
        (status_code = StatusCode::CONFLICT, description = "Payment is already verified"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Identity required"),
    ),
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    json: JsonBody<CancelPaymentRequest>,
    depot: &mut Depot,
) -> Result<Json<PaymentOutcomeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller();

    let payment = load_for(state, payment.into_inner().into(), &caller)
        .await?
        .uuid;

    let outcome = state
        .app
        .payments
        .cancel_payment(payment, json.into_inner().reason)
        .await
        .map_err(into_status_error)?;

    Ok(Json(PaymentOutcomeResponse::new(outcome, &caller)))
}
