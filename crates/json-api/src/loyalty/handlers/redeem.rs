//! Redeem Points Handler

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

use canteen_app::domain::loyalty::data::PointsRedemption;

use crate::{
    extensions::*, loyalty::into_status_error, state::State, vouchers::get::VoucherResponse,
};

/// Redeem Points Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RedeemPointsRequest {
    /// Points to exchange; a positive multiple of 100
    pub amount: u64,

    /// The balance the caller last saw
    pub expected_balance: u64,
}

/// Points Redemption Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PointsRedemptionResponse {
    /// Balance after the redemption
    pub points: u64,

    /// The single-use voucher minted for the points
    pub voucher: VoucherResponse,
}

impl From<PointsRedemption> for PointsRedemptionResponse {
    fn from(redemption: PointsRedemption) -> Self {
        Self {
            points: redemption.account.points,
            voucher: redemption.voucher.into(),
        }
    }
}

/// Redeem Points Handler
///
/// Exchanges the account holder's points for a single-use voucher worth ten
/// centavos per point, so 100 points buy ₱10.00 off.
#[endpoint(
    tags("loyalty"),
    summary = "Redeem Points",
    responses(
        (status_code = StatusCode::CREATED, description = "Points redeemed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid amount"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient points"),
        (status_code = StatusCode::NOT_FOUND, description = "Loyalty account not found"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Too much contention"),
    ),
)]
pub(crate) async fn handler(
    customer: PathParam<Uuid>,
    json: JsonBody<RedeemPointsRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<PointsRedemptionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.customer_or_401()?;
    let request = json.into_inner();

    if Uuid::from(caller.uuid) != customer.into_inner() {
        return Err(StatusError::not_found().brief("Loyalty account not found"));
    }

    let redemption = state
        .app
        .loyalty
        .redeem_points(caller, request.amount, request.expected_balance)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(redemption.into()))
}
