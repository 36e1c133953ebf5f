//! Pickup Tokens
//!
//! The QR code on a customer's order encodes `{"orderId": ..., "issuedAt": ...}`.
//! Staff may scan it with a camera, paste the raw payload from a screenshot
//! tool, or type the order id by hand; all three normalize to a [`PickupScan`].

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::orders::records::OrderUuid;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PickupScanError {
    #[error("scan is empty")]
    Empty,

    #[error("scan is neither a pickup token nor an order id")]
    Malformed,

    #[error("pickup token does not match the one issued for this order")]
    TokenMismatch,
}

/// What the QR code carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupToken {
    pub order_id: OrderUuid,
    pub issued_at: Timestamp,
}

impl PickupToken {
    #[must_use]
    pub const fn new(order_id: OrderUuid, issued_at: Timestamp) -> Self {
        Self {
            order_id,
            issued_at,
        }
    }

    /// The JSON payload rendered into the QR code.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be serialized.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A normalized staff scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupScan {
    /// A full token, from the camera or a pasted payload.
    Token(PickupToken),

    /// A bare order id typed by hand.
    OrderId(OrderUuid),
}

impl PickupScan {
    #[must_use]
    pub const fn order(&self) -> OrderUuid {
        match self {
            Self::Token(token) => token.order_id,
            Self::OrderId(order) => *order,
        }
    }

    /// A full token must match the issued one exactly; a typed id carries
    /// nothing to compare.
    ///
    /// # Errors
    ///
    /// Returns [`PickupScanError::TokenMismatch`] when the token differs.
    pub fn verify_against(&self, issued: &PickupToken) -> Result<(), PickupScanError> {
        match self {
            Self::Token(token) if token != issued => Err(PickupScanError::TokenMismatch),
            Self::Token(_) | Self::OrderId(_) => Ok(()),
        }
    }
}

/// Normalize a raw scan.
///
/// # Errors
///
/// Returns an error when the input is blank or is neither a token payload nor
/// an order id.
pub fn decode_scan(input: &str) -> Result<PickupScan, PickupScanError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(PickupScanError::Empty);
    }

    // A payload copied as a JSON string literal, e.g. "{\"orderId\":...}".
    if trimmed.starts_with('"')
        && let Ok(inner) = serde_json::from_str::<String>(trimmed)
    {
        return decode_unquoted(&inner);
    }

    decode_unquoted(trimmed.trim_matches(|c| c == '"' || c == '\''))
}

fn decode_unquoted(input: &str) -> Result<PickupScan, PickupScanError> {
    let input = input.trim();

    if input.is_empty() {
        return Err(PickupScanError::Empty);
    }

    if input.starts_with('{') {
        return serde_json::from_str::<PickupToken>(input)
            .map(PickupScan::Token)
            .map_err(|_malformed| PickupScanError::Malformed);
    }

    input
        .parse::<OrderUuid>()
        .map(PickupScan::OrderId)
        .map_err(|_malformed| PickupScanError::Malformed)
}
