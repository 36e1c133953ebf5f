//! Verify Payment Handler

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
    payments::{PaymentOutcomeResponse, into_status_error},
    state::State,
};

/// Verify Payment Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VerifyPaymentRequest {
    /// The amount in centavos staff saw arrive in the stall's GCash account
    pub observed_amount: u64,
}

/// Verify Payment Handler
///
/// Staff only. The observed amount must equal the payment amount exactly.
#[endpoint(
    tags("payments"),
    summary = "Verify Payment",
    responses(
        (status_code = StatusCode::OK, description = "Payment verified, or already finished"),
        (status_code = StatusCode::NOT_FOUND, description = "Payment not found"),
        (status_code = StatusCode::CONFLICT, description = "Payment is not awaiting verification"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Amount does not match"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Staff identity required"),
    ),
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    json: JsonBody<VerifyPaymentRequest>,
    depot: &mut Depot,
) -> Result<Json<PaymentOutcomeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let staff = depot.staff_or_401()?;

    let outcome = state
        .app
        .payments
        .verify_payment(
            payment.into_inner().into(),
            json.into_inner().observed_amount,
            staff,
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(PaymentOutcomeResponse::new(outcome, &depot.caller())))
}
