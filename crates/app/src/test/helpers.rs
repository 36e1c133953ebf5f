//! Test Helpers

use jiff::SignedDuration;

use crate::{
    domain::{
        orders::{
            OrdersService, OrdersServiceError,
            data::{NewOrder, OrderVoucher},
            records::{OrderRecord, OrderUuid},
        },
        parties::{Customer, CustomerUuid, StallUuid},
        vouchers::{
            VouchersService, VouchersServiceError,
            data::{Cart, NewVoucher, ReservedVoucher},
            records::{Targeting, VoucherDiscount, VoucherUuid},
        },
    },
    test::TestContext,
};

/// ₱20 off orders of ₱100 or more, open to everyone for the next month.
pub(crate) fn new_voucher(ctx: &TestContext, code: &str) -> NewVoucher {
    let now = ctx.now();

    NewVoucher {
        uuid: VoucherUuid::new(),
        code: code.to_owned(),
        discount: VoucherDiscount::FixedAmountOff { amount: 2_000 },
        min_order_amount: 10_000,
        valid_from: now - SignedDuration::from_hours(1),
        valid_until: now + SignedDuration::from_hours(24 * 30),
        max_usage: 10,
        user_targeting: Targeting::All,
        stall_targeting: Targeting::All,
        is_active: true,
    }
}

pub(crate) fn customer() -> Customer {
    Customer::new(CustomerUuid::new(), "ana@campus.edu")
}

/// Take one use for the default customer and a ₱150 cart.
pub(crate) async fn reserve(
    ctx: &TestContext,
    voucher: VoucherUuid,
    expected_usage_count: u64,
) -> Result<ReservedVoucher, VouchersServiceError> {
    ctx.vouchers
        .reserve_voucher(
            voucher,
            expected_usage_count,
            customer(),
            Cart {
                stall: StallUuid::new(),
                subtotal: 15_000,
            },
        )
        .await
}

pub(crate) async fn create_order(
    ctx: &TestContext,
    subtotal: u64,
    voucher: Option<VoucherUuid>,
) -> Result<OrderRecord, OrdersServiceError> {
    ctx.orders
        .create_order(NewOrder {
            uuid: OrderUuid::new(),
            customer: customer(),
            stall: StallUuid::new(),
            subtotal,
            voucher: voucher.map(|voucher| OrderVoucher {
                voucher,
                expected_usage_count: 0,
            }),
        })
        .await
}
