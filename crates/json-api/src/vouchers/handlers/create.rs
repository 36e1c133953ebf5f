//! Create Voucher Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use canteen_app::domain::vouchers::{data::NewVoucher, records::Targeting};

use crate::{
    extensions::*,
    state::State,
    vouchers::{
        get::{DiscountBody, VoucherResponse},
        into_status_error,
    },
};

/// Create Voucher Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateVoucherRequest {
    pub uuid: Uuid,

    /// Voucher code; stored upper-cased
    pub code: String,

    pub discount: DiscountBody,

    /// Minimum subtotal in centavos
    #[serde(default)]
    pub min_order_amount: u64,

    /// RFC 3339 timestamp
    pub valid_from: String,

    /// RFC 3339 timestamp
    pub valid_until: String,

    pub max_usage: u64,

    /// Restrict the voucher to these customer emails
    #[serde(default)]
    pub targeted_users: Option<Vec<String>>,

    /// Restrict the voucher to these stalls
    #[serde(default)]
    pub targeted_stalls: Option<Vec<Uuid>>,

    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

const fn active_by_default() -> bool {
    true
}

fn parse_timestamp(value: &str, field: &str) -> Result<Timestamp, StatusError> {
    value
        .parse()
        .map_err(|_invalid| StatusError::bad_request().brief(format!("Invalid {field}")))
}

impl TryFrom<CreateVoucherRequest> for NewVoucher {
    type Error = StatusError;

    fn try_from(request: CreateVoucherRequest) -> Result<Self, Self::Error> {
        Ok(NewVoucher {
            uuid: request.uuid.into(),
            valid_from: parse_timestamp(&request.valid_from, "valid_from")?,
            valid_until: parse_timestamp(&request.valid_until, "valid_until")?,
            code: request.code,
            discount: request.discount.into(),
            min_order_amount: request.min_order_amount,
            max_usage: request.max_usage,
            user_targeting: request
                .targeted_users
                .map_or(Targeting::All, |users| Targeting::Selected(users.into_iter().collect())),
            stall_targeting: request.targeted_stalls.map_or(Targeting::All, |stalls| {
                Targeting::Selected(stalls.into_iter().map(Into::into).collect())
            }),
            is_active: request.is_active,
        })
    }
}

/// Create Voucher Handler
///
/// Staff only. The code must be unique ignoring case.
#[endpoint(
    tags("vouchers"),
    summary = "Create Voucher",
    responses(
        (status_code = StatusCode::CREATED, description = "Voucher created"),
        (status_code = StatusCode::CONFLICT, description = "Voucher code already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Staff identity required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateVoucherRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<VoucherResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.staff_or_401()?;

    let voucher = state
        .app
        .vouchers
        .create_voucher(json.into_inner().try_into()?)
        .await
        .map_err(into_status_error)?;

    res.created_at(format!("/vouchers/{}", voucher.uuid))?;

    Ok(Json(voucher.into()))
}
