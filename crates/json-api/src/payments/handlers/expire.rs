//! Expire Payment Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    payments::{PaymentOutcomeResponse, into_status_error},
    state::State,
};

/// Expire Payment Handler
///
/// Staff only. Writes `EXPIRED` for a payment past its deadline and frees the
/// order for a new payment. Reads already report the expiry without this.
#[endpoint(
    tags("payments"),
    summary = "Expire Payment",
    responses(
        (status_code = StatusCode::OK, description = "Payment expired, or left as it was"),
        (status_code = StatusCode::NOT_FOUND, description = "Payment not found"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Staff identity required"),
    ),
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PaymentOutcomeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.staff_or_401()?;

    let outcome = state
        .app
        .payments
        .expire_payment(payment.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(PaymentOutcomeResponse::new(outcome, &depot.caller())))
}
