//! GCash mobile numbers
//!
//! Numbers are accepted in the forms people actually type (`0917 123 4567`,
//! `917-123-4567`, `+63 917 123 4567`, `639171234567`) and stored as the
//! eleven-digit `09XXXXXXXXX` form.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `09XX` prefixes allocated to Philippine mobile networks (Globe/TM,
/// Smart/TNT/Sun and DITO). Sorted for binary search.
const MOBILE_PREFIXES: [&str; 72] = [
    "0905", "0906", "0907", "0908", "0909", "0910", "0911", "0912", "0913", "0914", "0915",
    "0916", "0917", "0918", "0919", "0920", "0921", "0922", "0923", "0924", "0925", "0926",
    "0927", "0928", "0929", "0930", "0931", "0932", "0933", "0934", "0935", "0936", "0937",
    "0938", "0939", "0940", "0941", "0942", "0943", "0944", "0945", "0946", "0947", "0948",
    "0949", "0950", "0951", "0953", "0954", "0955", "0956", "0961", "0963", "0965", "0966",
    "0967", "0973", "0975", "0976", "0977", "0978", "0979", "0981", "0989", "0991", "0992",
    "0993", "0994", "0995", "0996", "0997", "0998",
];

const CANONICAL_LENGTH: usize = 11;

const MASK: &str = "****";

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PhoneNumberError {
    #[error("mobile number may only contain digits, spaces, dashes and a leading +")]
    InvalidCharacters,

    #[error("mobile number must have 10 or 11 digits, or 12 with the 63 country code")]
    InvalidLength,

    #[error("mobile number prefix is not a Philippine mobile network")]
    UnknownPrefix,
}

/// A validated mobile number in `09XXXXXXXXX` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GcashNumber(String);

impl GcashNumber {
    /// Validate and normalize a typed mobile number.
    ///
    /// # Errors
    ///
    /// Returns an error for characters other than digits, spaces and dashes
    /// (plus one leading `+`), for the wrong number of digits, or for a prefix
    /// outside the mobile network allocations.
    pub fn parse(input: &str) -> Result<Self, PhoneNumberError> {
        let trimmed = input.trim();
        let (plus, rest) = match trimmed.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let mut digits = String::with_capacity(rest.len());

        for c in rest.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' => {}
                _ => return Err(PhoneNumberError::InvalidCharacters),
            }
        }

        let canonical = match (plus, digits.len()) {
            (_, 12) if digits.starts_with("639") => {
                format!("0{}", digits.get(2..).unwrap_or_default())
            }
            (false, 11) if digits.starts_with("09") => digits,
            (false, 10) if digits.starts_with('9') => format!("0{digits}"),
            _ => return Err(PhoneNumberError::InvalidLength),
        };

        let prefix = canonical.get(..4).ok_or(PhoneNumberError::InvalidLength)?;

        if MOBILE_PREFIXES.binary_search(&prefix).is_err() {
            return Err(PhoneNumberError::UnknownPrefix);
        }

        Ok(Self(canonical))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `09XX****XXX`
    #[must_use]
    pub fn masked(&self) -> String {
        mask_number(&self.0)
    }
}

impl Display for GcashNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GcashNumber {
    type Error = PhoneNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GcashNumber> for String {
    fn from(value: GcashNumber) -> Self {
        value.0
    }
}

/// Keep the first four and last three characters with `****` between them.
/// Anything too short to keep both ends is fully masked.
#[must_use]
pub fn mask_number(number: &str) -> String {
    let chars: Vec<char> = number.chars().collect();

    if chars.len() < CANONICAL_LENGTH - MASK.len() {
        return MASK.to_owned();
    }

    let head: String = chars.iter().take(4).collect();
    let tail: String = chars.iter().skip(chars.len() - 3).collect();

    format!("{head}{MASK}{tail}")
}
