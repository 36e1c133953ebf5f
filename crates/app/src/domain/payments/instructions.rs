//! Payment Instructions

use jiff::Timestamp;

use crate::domain::payments::records::PaymentRecord;

/// What the customer needs to complete a GCash transfer by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInstructions {
    pub reference_code: String,
    pub stall_gcash_number: String,
    pub amount: u64,
    pub expires_at: Timestamp,
    pub steps: Vec<String>,
    pub notes: Vec<String>,
}

impl PaymentInstructions {
    #[must_use]
    pub fn for_payment(payment: &PaymentRecord) -> Self {
        let amount = format_amount(payment.amount);

        let steps = vec![
            "Open the GCash app and log in.".to_owned(),
            "Tap \"Send\" on the home screen.".to_owned(),
            "Choose \"Express Send\".".to_owned(),
            format!("Enter the stall's GCash number: {}", payment.stall_gcash_number),
            format!("Enter the exact amount: PHP {amount}"),
            format!(
                "Type the reference code {} in the message field.",
                payment.reference_code
            ),
            "Review the details and tap \"Send\".".to_owned(),
            "Enter the reference number from your GCash receipt on the order page.".to_owned(),
        ];

        let notes = vec![
            format!("Send exactly PHP {amount}; a different amount cannot be verified."),
            format!(
                "Include {} in the message so staff can match your transfer.",
                payment.reference_code
            ),
            format!(
                "This payment expires {} minutes after it was created.",
                payment.expires_at.duration_since(payment.created_at).as_mins()
            ),
            "Keep this page open until staff verify your payment.".to_owned(),
        ];

        Self {
            reference_code: payment.reference_code.clone(),
            stall_gcash_number: payment.stall_gcash_number.clone(),
            amount: payment.amount,
            expires_at: payment.expires_at,
            steps,
            notes,
        }
    }
}

/// Centavos as `1,234.56`.
#[must_use]
pub fn format_amount(centavos: u64) -> String {
    let whole = (centavos / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);

    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }

        grouped.push(digit);
    }

    format!("{grouped}.{:02}", centavos % 100)
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use crate::domain::{
        orders::records::OrderUuid,
        parties::{CustomerUuid, StallUuid},
        payments::{records::PaymentUuid, state::PaymentStatus},
    };

    use super::*;

    #[test]
    fn instructions_carry_the_mandatory_fields() {
        let created_at = Timestamp::UNIX_EPOCH;

        let payment = PaymentRecord {
            uuid: PaymentUuid::new(),
            order: OrderUuid::new(),
            customer: CustomerUuid::new(),
            stall: StallUuid::new(),
            stall_gcash_number: "09171234567".to_owned(),
            amount: 15_000,
            reference_code: "GC-LOYW3V28-DEAD0B01".to_owned(),
            status: PaymentStatus::Pending,
            customer_gcash_number: None,
            gcash_reference_number: None,
            created_at,
            expires_at: created_at + SignedDuration::from_mins(15),
            verified_at: None,
            verified_by: None,
            completed_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            refunded_at: None,
            refunded_by: None,
            updated_at: created_at,
        };

        let instructions = PaymentInstructions::for_payment(&payment);

        assert_eq!(instructions.steps.len(), 8);
        assert_eq!(instructions.amount, 15_000);
        assert_eq!(instructions.reference_code, payment.reference_code);
        assert!(
            instructions
                .steps
                .iter()
                .any(|step| step.contains("09171234567"))
        );
        assert!(instructions.steps.iter().any(|step| step.contains("150.00")));
        assert!(instructions.notes.iter().any(|note| note.contains("15 minutes")));
    }

    #[test]
    fn amounts_render_with_grouping_and_centavos() {
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(15_000), "150.00");
        assert_eq!(format_amount(1_234_567), "12,345.67");
        assert_eq!(format_amount(100_000_000), "1,000,000.00");
    }
}
