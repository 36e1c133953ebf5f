//! Order Records

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        parties::{Customer, CustomerUuid, StallUuid},
        payments::records::PaymentUuid,
        vouchers::records::VoucherUuid,
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// The next kitchen step staff can move the order to. Completion only
    /// happens through a pickup scan.
    #[must_use]
    pub const fn next_kitchen_step(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Preparing),
            Self::Preparing => Some(Self::Ready),
            Self::Ready | Self::Completed | Self::Cancelled => None,
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Where the order's voucher use stands. Only `Reserved` can move, so a use is
/// committed or handed back at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    Reserved,
    Committed,
    Released,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedVoucher {
    pub voucher: VoucherUuid,
    pub code: String,
    pub discount: u64,
    pub state: ReservationState,
}

/// Order Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub customer: CustomerUuid,
    pub customer_email: String,
    pub stall: StallUuid,
    pub qr_token: String,
    pub status: OrderStatus,
    pub subtotal: u64,
    pub total: u64,
    pub applied_voucher: Option<AppliedVoucher>,
    pub active_payment: Option<PaymentUuid>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
}

impl OrderRecord {
    #[must_use]
    pub fn customer(&self) -> Customer {
        Customer::new(self.customer, self.customer_email.clone())
    }
}
