//! Get Loyalty Account Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use canteen_app::domain::{
    loyalty::{
        data::LoyaltySummary,
        records::{LoyaltyTransaction, TransactionKind},
    },
    parties::CustomerUuid,
};

use crate::{
    extensions::*,
    identity::Caller,
    loyalty::into_status_error,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LoyaltyTransactionResponse {
    /// `earned` or `redeemed`
    pub kind: String,

    pub points: u64,

    pub description: String,

    /// Code of the voucher minted by a redemption
    pub voucher_code: Option<String>,

    pub timestamp: String,
}

impl From<LoyaltyTransaction> for LoyaltyTransactionResponse {
    fn from(transaction: LoyaltyTransaction) -> Self {
        Self {
            kind: match transaction.kind {
                TransactionKind::Earned => "earned",
                TransactionKind::Redeemed => "redeemed",
            }
            .to_owned(),
            points: transaction.points,
            description: transaction.description,
            voucher_code: transaction.voucher_code,
            timestamp: transaction.timestamp.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LoyaltyAccountResponse {
    pub customer: Uuid,

    pub points: u64,

    /// `bronze`, `silver` or `gold`
    pub tier: String,

    /// The next tier up, absent at the top
    pub next_tier: Option<String>,

    /// Points still needed for the next tier
    pub points_to_next_tier: Option<u64>,

    /// Most recent first
    pub transactions: Vec<LoyaltyTransactionResponse>,
}

impl From<LoyaltySummary> for LoyaltyAccountResponse {
    fn from(summary: LoyaltySummary) -> Self {
        Self {
            customer: summary.customer.into(),
            points: summary.points,
            tier: summary.tier.to_string(),
            next_tier: summary.next_tier.map(|next| next.tier.to_string()),
            points_to_next_tier: summary.next_tier.map(|next| next.points_needed),
            transactions: summary
                .transactions
                .into_iter()
                .rev()
                .map(Into::into)
                .collect(),
        }
    }
}

/// Get Loyalty Account Handler
///
/// Balance, tier and history, for the account holder or staff.
#[endpoint(
    tags("loyalty"),
    summary = "Get Loyalty Account",
    responses(
        (status_code = StatusCode::OK, description = "Loyalty account"),
        (status_code = StatusCode::NOT_FOUND, description = "Loyalty account not found"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Identity required"),
    ),
)]
pub(crate) async fn handler(
    customer: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<LoyaltyAccountResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let customer: CustomerUuid = customer.into_inner().into();

    match depot.caller() {
        Caller::Staff(_) => {}
        Caller::Customer(caller) if caller.uuid == customer => {}
        Caller::Customer(_) => {
            return Err(StatusError::not_found().brief("Loyalty account not found"));
        }
        Caller::Anonymous => return Err(StatusError::unauthorized().brief("Identity required")),
    }

    let summary = state
        .app
        .loyalty
        .get_account(customer)
        .await
        .map_err(into_status_error)?;

    Ok(Json(summary.into()))
}
