//! Payment Handlers

use std::{string::ToString, sync::Arc};

use salvo::{http::StatusError, oapi::ToSchema};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use canteen_app::domain::payments::{
    data::PaymentOutcome,
    records::{PaymentRecord, PaymentUuid},
};

use crate::{identity::Caller, observability, payments::into_status_error, state::State};

pub(crate) mod cancel;
pub(crate) mod complete;
pub(crate) mod create;
pub(crate) mod expire;
pub(crate) mod get;
pub(crate) mod refund;
pub(crate) mod submit_reference;
pub(crate) mod verify;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentResponse {
    pub uuid: Uuid,

    pub order: Uuid,

    /// Amount due in centavos
    pub amount: u64,

    /// Code the customer types into the GCash message field
    pub reference_code: String,

    /// One of `PENDING`, `AWAITING_VERIFICATION`, `VERIFIED`, `COMPLETED`,
    /// `FAILED`, `EXPIRED` or `REFUNDED`
    pub status: String,

    pub stall_gcash_number: String,

    /// Masked for anyone but the paying customer
    pub customer_gcash_number: Option<String>,

    /// The 13-digit number from the customer's GCash receipt
    pub gcash_reference_number: Option<String>,

    pub created_at: String,

    pub expires_at: String,

    pub verified_at: Option<String>,

    pub verified_by: Option<String>,

    pub completed_at: Option<String>,

    pub cancelled_at: Option<String>,

    pub cancellation_reason: Option<String>,

    pub refunded_at: Option<String>,

    pub refunded_by: Option<String>,

    pub updated_at: String,
}

impl From<PaymentRecord> for PaymentResponse {
    fn from(payment: PaymentRecord) -> Self {
        Self {
            uuid: payment.uuid.into(),
            order: payment.order.into(),
            amount: payment.amount,
            reference_code: payment.reference_code,
            status: payment.status.as_str().to_owned(),
            stall_gcash_number: payment.stall_gcash_number,
            customer_gcash_number: payment.customer_gcash_number,
            gcash_reference_number: payment.gcash_reference_number,
            created_at: payment.created_at.to_string(),
            expires_at: payment.expires_at.to_string(),
            verified_at: payment.verified_at.as_ref().map(ToString::to_string),
            verified_by: payment.verified_by.as_ref().map(ToString::to_string),
            completed_at: payment.completed_at.as_ref().map(ToString::to_string),
            cancelled_at: payment.cancelled_at.as_ref().map(ToString::to_string),
            cancellation_reason: payment.cancellation_reason,
            refunded_at: payment.refunded_at.as_ref().map(ToString::to_string),
            refunded_by: payment.refunded_by.as_ref().map(ToString::to_string),
            updated_at: payment.updated_at.to_string(),
        }
    }
}

/// Payment Lifecycle Response
///
/// The payment as written by the operation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentOutcomeResponse {
    /// False when the payment had already finished and nothing was written
    pub transitioned: bool,

    pub payment: PaymentResponse,
}

impl PaymentOutcomeResponse {
    fn new(outcome: PaymentOutcome, caller: &Caller) -> Self {
        let transitioned = outcome.is_transitioned();
        let payment = outcome.into_payment().masked_for(&caller.viewer());

        if transitioned {
            observability::record_payment_transition(payment.status.as_str());
        }

        Self {
            transitioned,
            payment: payment.into(),
        }
    }
}

/// Load a payment the caller may act on. Customers only reach their own
/// payments; anyone else's reads as missing.
async fn load_for(
    state: &Arc<State>,
    payment: PaymentUuid,
    caller: &Caller,
) -> Result<PaymentRecord, StatusError> {
    if *caller == Caller::Anonymous {
        return Err(StatusError::unauthorized().brief("Identity required"));
    }

    let record = state
        .app
        .payments
        .get_payment(payment, caller.viewer())
        .await
        .map_err(into_status_error)?;

    match caller {
        Caller::Customer(customer) if customer.uuid != record.customer => {
            Err(StatusError::not_found().brief("Payment not found"))
        }
        _ => Ok(record),
    }
}
