//! Payments Data

use crate::domain::{
    parties::{CustomerUuid, StaffId},
    payments::{instructions::PaymentInstructions, records::PaymentRecord},
};

/// Who is looking at a payment. Only the paying customer sees their own
/// GCash number unmasked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Customer(CustomerUuid),
    Staff(StaffId),
    Anonymous,
}

impl Viewer {
    #[must_use]
    pub fn is_customer(&self, customer: CustomerUuid) -> bool {
        matches!(self, Self::Customer(viewer) if *viewer == customer)
    }
}

/// Newly created payment and what to show the customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPayment {
    pub payment: PaymentRecord,
    pub instructions: PaymentInstructions,
}

/// Result of a lifecycle operation. Operations on a payment that has already
/// finished, or that expire it on the way in, leave it as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Transitioned(PaymentRecord),
    Unchanged(PaymentRecord),
}

impl PaymentOutcome {
    #[must_use]
    pub fn payment(&self) -> &PaymentRecord {
        match self {
            Self::Transitioned(payment) | Self::Unchanged(payment) => payment,
        }
    }

    #[must_use]
    pub fn into_payment(self) -> PaymentRecord {
        match self {
            Self::Transitioned(payment) | Self::Unchanged(payment) => payment,
        }
    }

    #[must_use]
    pub const fn is_transitioned(&self) -> bool {
        matches!(self, Self::Transitioned(_))
    }
}
