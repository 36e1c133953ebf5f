//! Preview Voucher Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use canteen_app::domain::vouchers::data::{Cart, DiscountPreview};

use crate::{extensions::*, state::State, vouchers::into_status_error};

/// Preview Voucher Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PreviewVoucherRequest {
    pub code: String,

    /// The stall the cart belongs to
    pub stall: Uuid,

    /// Cart subtotal in centavos
    pub subtotal: u64,
}

/// Voucher Preview Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VoucherPreviewResponse {
    pub voucher: Uuid,

    pub code: String,

    /// Pass back as `expected_usage_count` when placing the order
    pub usage_count: u64,

    /// Discount in centavos
    pub discount: u64,

    /// Subtotal after the discount
    pub total: u64,
}

impl VoucherPreviewResponse {
    fn new(preview: DiscountPreview, subtotal: u64) -> Self {
        Self {
            voucher: preview.voucher.into(),
            code: preview.code,
            usage_count: preview.usage_count,
            discount: preview.discount,
            total: subtotal.saturating_sub(preview.discount),
        }
    }
}

/// Preview Voucher Handler
///
/// Checks a code against the caller's cart without reserving a use.
#[endpoint(
    tags("vouchers"),
    summary = "Preview Voucher",
    responses(
        (status_code = StatusCode::OK, description = "Voucher applies"),
        (status_code = StatusCode::NOT_FOUND, description = "Voucher not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Voucher cannot be applied"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Customer identity required"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<PreviewVoucherRequest>,
    depot: &mut Depot,
) -> Result<Json<VoucherPreviewResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let customer = depot.customer_or_401()?;
    let request = json.into_inner();

    let cart = Cart {
        stall: request.stall.into(),
        subtotal: request.subtotal,
    };

    let preview = state
        .app
        .vouchers
        .preview_discount(request.code, customer, cart)
        .await
        .map_err(into_status_error)?;

    Ok(Json(VoucherPreviewResponse::new(preview, request.subtotal)))
}
