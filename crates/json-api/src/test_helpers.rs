//! Test helpers.

use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use salvo::{affix_state::inject, prelude::*, test::RequestBuilder};

use canteen_app::{
    context::AppContext,
    domain::{
        loyalty::MockLoyaltyService,
        orders::{
            MockOrdersService,
            records::{OrderRecord, OrderStatus, OrderUuid},
        },
        parties::{Customer, CustomerUuid, StaffId, StallUuid},
        payments::{
            MockPaymentsService,
            records::{PaymentRecord, PaymentUuid},
            state::PaymentStatus,
        },
        vouchers::{
            MockVouchersService,
            records::{Targeting, VoucherDiscount, VoucherRecord, VoucherUuid},
        },
    },
    store::StoreKind,
};

use crate::{
    identity::{self, CUSTOMER_EMAIL_HEADER, CUSTOMER_UUID_HEADER, STAFF_ID_HEADER},
    state::State,
};

/// 2026-03-02T08:00:00Z
pub(crate) const NOW: Timestamp = Timestamp::constant(1_772_438_400, 0);

pub(crate) const STAFF: &str = "counter-1";

/// Service mocks; any call without a matching expectation fails the test.
#[derive(Default)]
pub(crate) struct Mocks {
    pub vouchers: MockVouchersService,
    pub loyalty: MockLoyaltyService,
    pub orders: MockOrdersService,
    pub payments: MockPaymentsService,
}

pub(crate) fn state(mocks: Mocks) -> Arc<State> {
    State::from_app_context(AppContext {
        vouchers: Arc::new(mocks.vouchers),
        loyalty: Arc::new(mocks.loyalty),
        orders: Arc::new(mocks.orders),
        payments: Arc::new(mocks.payments),
        store_kind: StoreKind::Memory,
    })
}

pub(crate) fn service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state(mocks)))
            .hoop(identity::handler)
            .push(route),
    )
}

pub(crate) fn customer() -> Customer {
    Customer::new(
        CustomerUuid::from(uuid::Uuid::from_u128(0xA1)),
        "ana@campus.edu",
    )
}

pub(crate) fn as_customer(request: RequestBuilder) -> RequestBuilder {
    let customer = customer();

    request
        .add_header(CUSTOMER_UUID_HEADER, customer.uuid.to_string(), true)
        .add_header(CUSTOMER_EMAIL_HEADER, customer.email, true)
}

pub(crate) fn as_staff(request: RequestBuilder) -> RequestBuilder {
    request.add_header(STAFF_ID_HEADER, STAFF, true)
}

pub(crate) fn staff() -> StaffId {
    StaffId::new(STAFF)
}

pub(crate) fn make_voucher(uuid: VoucherUuid) -> VoucherRecord {
    VoucherRecord {
        uuid,
        code: "WELCOME20".to_owned(),
        discount: VoucherDiscount::FixedAmountOff { amount: 2_000 },
        min_order_amount: 10_000,
        valid_from: NOW,
        valid_until: NOW + SignedDuration::from_hours(24 * 30),
        max_usage: 10,
        usage_count: 0,
        user_targeting: Targeting::All,
        stall_targeting: Targeting::All,
        is_active: true,
        created_at: NOW,
        updated_at: NOW,
    }
}

pub(crate) fn make_order(uuid: OrderUuid) -> OrderRecord {
    let customer = customer();

    OrderRecord {
        uuid,
        customer: customer.uuid,
        customer_email: customer.email,
        stall: StallUuid::from(uuid::Uuid::from_u128(0x5)),
        qr_token: format!(r#"{{"orderId":"{uuid}","issuedAt":"{NOW}"}}"#),
        status: OrderStatus::Pending,
        subtotal: 15_000,
        total: 15_000,
        applied_voucher: None,
        active_payment: None,
        created_at: NOW,
        updated_at: NOW,
        completed_at: None,
        cancelled_at: None,
    }
}

pub(crate) fn make_payment(uuid: PaymentUuid, status: PaymentStatus) -> PaymentRecord {
    let order = make_order(OrderUuid::from(uuid::Uuid::from_u128(0x0D)));

    PaymentRecord {
        uuid,
        order: order.uuid,
        customer: order.customer,
        stall: order.stall,
        stall_gcash_number: "09175550101".to_owned(),
        amount: order.total,
        reference_code: "GC-1772438400-0A1B2C3D".to_owned(),
        status,
        customer_gcash_number: None,
        gcash_reference_number: None,
        created_at: NOW,
        expires_at: NOW + SignedDuration::from_mins(15),
        verified_at: None,
        verified_by: None,
        completed_at: None,
        cancelled_at: None,
        cancellation_reason: None,
        refunded_at: None,
        refunded_by: None,
        updated_at: NOW,
    }
}
