//! Submit Payment Reference Handler

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

/// Submit Payment Reference Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SubmitReferenceRequest {
    /// Reference number from the GCash receipt; spaces and dashes are ignored
    pub reference_number: String,

    /// The GCash number the transfer was sent from
    #[serde(default)]
    pub customer_gcash_number: Option<String>,
}

/// Submit Payment Reference Handler
///
/// The paying customer records their GCash receipt, moving the payment to
/// `AWAITING_VERIFICATION`.
#[endpoint(
    tags("payments"),
    summary = "Submit Payment Reference",
    responses(
        (status_code = StatusCode::OK, description = "Reference recorded, or payment already finished"),
        (status_code = StatusCode::BAD_REQUEST, description = "Malformed reference or GCash number"),
        (status_code = StatusCode::NOT_FOUND, description = "Payment not found"),
        (status_code = StatusCode::CONFLICT, description = "Payment is not pending"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Customer identity required"),
    ),
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    json: JsonBody<SubmitReferenceRequest>,
    depot: &mut Depot,
) -> Result<Json<PaymentOutcomeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.customer_or_401()?;

    let caller = depot.caller();
    let payment = load_for(state, payment.into_inner().into(), &caller)
        .await?
        .uuid;
    let request = json.into_inner();

    let outcome = state
        .app
        .payments
        .submit_payment_reference(
            payment,
            request.reference_number,
            request.customer_gcash_number,
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(PaymentOutcomeResponse::new(outcome, &caller)))
}
