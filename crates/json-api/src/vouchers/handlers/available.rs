//! Available Vouchers Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use canteen_app::domain::vouchers::data::{AvailableVoucher, Cart};

use crate::{
    extensions::*,
    state::State,
    vouchers::{get::VoucherResponse, into_status_error},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AvailableVoucherResponse {
    pub voucher: VoucherResponse,

    /// Discount in centavos this voucher would give the cart
    pub discount: u64,
}

impl From<AvailableVoucher> for AvailableVoucherResponse {
    fn from(available: AvailableVoucher) -> Self {
        Self {
            voucher: available.voucher.into(),
            discount: available.discount,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AvailableVouchersResponse {
    pub vouchers: Vec<AvailableVoucherResponse>,
}

/// Available Vouchers Handler
///
/// Lists the vouchers the caller could apply to a cart right now.
#[endpoint(
    tags("vouchers"),
    summary = "List Available Vouchers",
    responses(
        (status_code = StatusCode::OK, description = "Applicable vouchers"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Customer identity required"),
    ),
)]
pub(crate) async fn handler(
    stall: QueryParam<Uuid, true>,
    subtotal: QueryParam<u64, true>,
    depot: &mut Depot,
) -> Result<Json<AvailableVouchersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let customer = depot.customer_or_401()?;

    let cart = Cart {
        stall: stall.into_inner().into(),
        subtotal: subtotal.into_inner(),
    };

    let vouchers = state
        .app
        .vouchers
        .list_available_vouchers(customer, cart)
        .await
        .map_err(into_status_error)?;

    Ok(Json(AvailableVouchersResponse {
        vouchers: vouchers.into_iter().map(Into::into).collect(),
    }))
}
