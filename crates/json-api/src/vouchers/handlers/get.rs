//! Get Voucher Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use canteen_app::domain::vouchers::records::{Targeting, VoucherDiscount, VoucherRecord};

use crate::{extensions::*, state::State, vouchers::into_status_error};

/// Voucher Discount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum DiscountBody {
    /// A fixed amount in centavos off the subtotal
    FixedAmountOff { amount: u64 },

    /// A percentage off the subtotal, optionally capped
    PercentageOff {
        percentage: u16,
        max_discount: Option<u64>,
    },
}

impl From<VoucherDiscount> for DiscountBody {
    fn from(discount: VoucherDiscount) -> Self {
        match discount {
            VoucherDiscount::FixedAmountOff { amount } => Self::FixedAmountOff { amount },
            VoucherDiscount::PercentageOff {
                percentage,
                max_discount,
            } => Self::PercentageOff {
                percentage,
                max_discount,
            },
        }
    }
}

impl From<DiscountBody> for VoucherDiscount {
    fn from(discount: DiscountBody) -> Self {
        match discount {
            DiscountBody::FixedAmountOff { amount } => Self::FixedAmountOff { amount },
            DiscountBody::PercentageOff {
                percentage,
                max_discount,
            } => Self::PercentageOff {
                percentage,
                max_discount,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VoucherResponse {
    /// The unique identifier of the voucher
    pub uuid: Uuid,

    /// The upper-cased voucher code
    pub code: String,

    pub discount: DiscountBody,

    /// Minimum subtotal in centavos
    pub min_order_amount: u64,

    pub valid_from: String,

    pub valid_until: String,

    pub max_usage: u64,

    pub usage_count: u64,

    pub remaining_uses: u64,

    /// Targeted customer emails; absent when every customer is eligible
    pub targeted_users: Option<Vec<String>>,

    /// Targeted stalls; absent when every stall is eligible
    pub targeted_stalls: Option<Vec<Uuid>>,

    pub is_active: bool,

    pub created_at: String,

    pub updated_at: String,
}

fn selected<T, U>(targeting: Targeting<T>, map: impl Fn(T) -> U) -> Option<Vec<U>> {
    match targeting {
        Targeting::All => None,
        Targeting::Selected(selected) => Some(selected.into_iter().map(map).collect()),
    }
}

impl From<VoucherRecord> for VoucherResponse {
    fn from(voucher: VoucherRecord) -> Self {
        VoucherResponse {
            uuid: voucher.uuid.into(),
            remaining_uses: voucher.remaining_uses(),
            code: voucher.code,
            discount: voucher.discount.into(),
            min_order_amount: voucher.min_order_amount,
            valid_from: voucher.valid_from.to_string(),
            valid_until: voucher.valid_until.to_string(),
            max_usage: voucher.max_usage,
            usage_count: voucher.usage_count,
            targeted_users: selected(voucher.user_targeting, |email| email),
            targeted_stalls: selected(voucher.stall_targeting, Uuid::from),
            is_active: voucher.is_active,
            created_at: voucher.created_at.to_string(),
            updated_at: voucher.updated_at.to_string(),
        }
    }
}

/// Get Voucher Handler
///
/// Returns a voucher with its current usage.
#[endpoint(
    tags("vouchers"),
    summary = "Get Voucher",
    responses(
        (status_code = StatusCode::OK, description = "Voucher found"),
        (status_code = StatusCode::NOT_FOUND, description = "Voucher not found"),
    ),
)]
pub(crate) async fn handler(
    voucher: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<VoucherResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let voucher = state
        .app
        .vouchers
        .get_voucher(voucher.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(voucher.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use canteen_app::domain::vouchers::{VouchersServiceError, records::VoucherUuid};

    use crate::test_helpers::{Mocks, make_voucher, service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service(mocks, Router::with_path("vouchers/{voucher}").get(handler))
    }

    #[tokio::test]
    async fn test_get_voucher_success() -> TestResult {
        let uuid = VoucherUuid::new();
        let voucher = make_voucher(uuid);

        let mut mocks = Mocks::default();

        mocks
            .vouchers
            .expect_get_voucher()
            .once()
            .withf(move |requested| *requested == uuid)
            .return_once(move |_| Ok(voucher));

        let mut res = TestClient::get(format!("http://example.com/vouchers/{uuid}"))
            .send(&make_service(mocks))
            .await;

        let body: VoucherResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.code, "WELCOME20");
        assert_eq!(body.discount, DiscountBody::FixedAmountOff { amount: 2_000 });
        assert_eq!(body.remaining_uses, 10);
        assert_eq!(body.targeted_users, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_voucher_not_found_returns_404() {
        let mut mocks = Mocks::default();

        mocks
            .vouchers
            .expect_get_voucher()
            .once()
            .return_once(|_| Err(VouchersServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/vouchers/{}", VoucherUuid::new()))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }
}
