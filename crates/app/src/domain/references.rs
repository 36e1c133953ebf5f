//! Reference Codes
//!
//! Short tracking codes a customer can read aloud or type into a transfer
//! message: `PREFIX-<base36 millis>-<8 hex>`. Generation alone does not make a
//! code unique; callers claim it in a codes collection and draw again when the
//! claim is already taken.

use jiff::Timestamp;
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::{Documents, StoreError};

/// Prefix for GCash payment reference codes.
pub const PAYMENT_REFERENCE_PREFIX: &str = "GC";

/// Prefix for vouchers minted from loyalty points.
pub const LOYALTY_VOUCHER_PREFIX: &str = "PTS";

const RANDOM_BYTES: usize = 4;

/// Generate a reference code for `prefix` at `now`.
///
/// The prefix is upper-cased and stripped to ASCII alphanumerics.
#[must_use]
pub fn generate_reference(prefix: &str, now: Timestamp) -> String {
    let mut random = [0_u8; RANDOM_BYTES];

    OsRng.fill_bytes(&mut random);

    format_reference(prefix, now, random)
}

fn format_reference(prefix: &str, now: Timestamp, random: [u8; RANDOM_BYTES]) -> String {
    let prefix: String = prefix
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let millis = u64::try_from(now.as_millisecond()).unwrap_or(0);

    format!(
        "{prefix}-{}-{:08X}",
        encode_base36(millis),
        u32::from_be_bytes(random)
    )
}

fn encode_base36(mut value: u64) -> String {
    let mut encoded = Vec::with_capacity(13);

    loop {
        let digit = u32::try_from(value % 36)
            .ok()
            .and_then(|digit| char::from_digit(digit, 36))
            .map_or('0', |digit| digit.to_ascii_uppercase());

        encoded.push(digit);
        value /= 36;

        if value == 0 {
            break;
        }
    }

    encoded.iter().rev().collect()
}

/// A claimed code and the document that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CodeClaim {
    pub owner: String,
    pub claimed_at: Timestamp,
}

/// Claim a fresh code for `owner`, drawing a new one whenever the previous
/// draw was already taken.
pub(crate) async fn claim_generated_code(
    claims: &Documents<CodeClaim>,
    prefix: &str,
    owner: String,
    now: Timestamp,
    attempts: u32,
) -> Result<String, StoreError> {
    for attempt in 1..=attempts {
        let code = generate_reference(prefix, now);

        let claim = CodeClaim {
            owner: owner.clone(),
            claimed_at: now,
        };

        match claims.insert(&code, claim).await {
            Ok(_) => return Ok(code),
            Err(StoreError::AlreadyExists) => {
                warn!(attempt, prefix, "reference code collision, drawing again");
            }
            Err(error) => return Err(error),
        }
    }

    Err(StoreError::AlreadyExists)
}
