//! Loyalty Records

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::domain::parties::CustomerUuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Earned,
    Redeemed,
}

/// One entry in an account's points ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyTransaction {
    pub kind: TransactionKind,
    pub points: u64,
    pub description: String,
    pub voucher_code: Option<String>,
    pub timestamp: Timestamp,
}

/// Loyalty Account Record
///
/// `points` and `transactions` only ever change together, in one document
/// write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyAccountRecord {
    pub customer: CustomerUuid,
    pub email: String,
    pub points: u64,
    pub transactions: Vec<LoyaltyTransaction>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
