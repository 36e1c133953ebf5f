//! Get Payment Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    payments::{PaymentResponse, handlers::load_for},
    state::State,
};

/// Get Payment Handler
///
/// Returns a payment with its status as of now. The customer's GCash number
/// is masked for everyone but that customer.
#[endpoint(
    tags("payments"),
    summary = "Get Payment",
    responses(
        (status_code = StatusCode::OK, description = "Payment found"),
        (status_code = StatusCode::NOT_FOUND, description = "Payment not found"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Identity required"),
    ),
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PaymentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let payment = load_for(state, payment.into_inner().into(), &depot.caller()).await?;

    Ok(Json(payment.into()))
}
