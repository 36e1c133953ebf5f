//! Payment Records

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        orders::records::OrderUuid,
        parties::{CustomerUuid, StaffId, StallUuid},
        payments::{data::Viewer, phone, state::PaymentStatus},
    },
    uuids::TypedUuid,
};

/// Payment UUID
pub type PaymentUuid = TypedUuid<PaymentRecord>;

/// One GCash person-to-person payment attempt for an order.
///
/// `amount` is copied from the order total when the payment is created and
/// never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub uuid: PaymentUuid,
    pub order: OrderUuid,
    pub customer: CustomerUuid,
    pub stall: StallUuid,
    pub stall_gcash_number: String,
    pub amount: u64,
    pub reference_code: String,
    pub status: PaymentStatus,
    pub customer_gcash_number: Option<String>,
    pub gcash_reference_number: Option<String>,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub verified_at: Option<Timestamp>,
    pub verified_by: Option<StaffId>,
    pub completed_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub cancellation_reason: Option<String>,
    pub refunded_at: Option<Timestamp>,
    pub refunded_by: Option<StaffId>,
    pub updated_at: Timestamp,
}

impl PaymentRecord {
    #[must_use]
    pub fn effective_status(&self, now: Timestamp) -> PaymentStatus {
        self.status.effective(self.expires_at, now)
    }

    /// Open, but past its deadline and not yet written as expired.
    #[must_use]
    pub fn is_due_to_expire(&self, now: Timestamp) -> bool {
        !self.status.is_terminal() && self.effective_status(now) == PaymentStatus::Expired
    }

    /// The payment as `viewer` may see it at `now`: status normalized and the
    /// customer's number masked for anyone but that customer.
    #[must_use]
    pub fn view_for(mut self, viewer: &Viewer, now: Timestamp) -> Self {
        self.status = self.effective_status(now);

        self.masked_for(viewer)
    }

    /// The customer's number masked unless `viewer` is that customer.
    #[must_use]
    pub fn masked_for(mut self, viewer: &Viewer) -> Self {
        if !viewer.is_customer(self.customer) {
            self.customer_gcash_number = self
                .customer_gcash_number
                .as_deref()
                .map(phone::mask_number);
        }

        self
    }
}
