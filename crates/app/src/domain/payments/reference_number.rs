//! GCash transaction reference numbers

use std::fmt::{Display, Formatter, Result as FmtResult};

use thiserror::Error;

pub const MIN_DIGITS: usize = 10;
pub const MAX_DIGITS: usize = 20;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ReferenceNumberError {
    #[error("reference number may only contain digits")]
    NotNumeric,

    #[error("reference number must have between 10 and 20 digits, got {0}")]
    InvalidLength(usize),
}

/// The reference number printed on the customer's GCash receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcashReferenceNumber(String);

impl GcashReferenceNumber {
    /// Strip whitespace and validate.
    ///
    /// # Errors
    ///
    /// Returns an error for non-digit characters or a digit count outside
    /// 10 to 20.
    pub fn parse(input: &str) -> Result<Self, ReferenceNumberError> {
        let digits: String = input.chars().filter(|c| !c.is_whitespace()).collect();

        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ReferenceNumberError::NotNumeric);
        }

        if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
            return Err(ReferenceNumberError::InvalidLength(digits.len()));
        }

        Ok(Self(digits))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for GcashReferenceNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn whitespace_is_ignored() -> TestResult {
        let number = GcashReferenceNumber::parse(" 1234 567 890 123\n")?;

        assert_eq!(number.as_str(), "1234567890123");

        Ok(())
    }

    #[test]
    fn length_bounds_are_inclusive() {
        assert!(GcashReferenceNumber::parse("1234567890").is_ok());
        assert!(GcashReferenceNumber::parse(&"9".repeat(20)).is_ok());

        assert_eq!(
            GcashReferenceNumber::parse("123456789"),
            Err(ReferenceNumberError::InvalidLength(9))
        );
        assert_eq!(
            GcashReferenceNumber::parse(&"9".repeat(21)),
            Err(ReferenceNumberError::InvalidLength(21))
        );
    }

    #[test]
    fn letters_and_dashes_are_rejected() {
        assert_eq!(
            GcashReferenceNumber::parse("1234-5678-9012"),
            Err(ReferenceNumberError::NotNumeric)
        );
        assert_eq!(
            GcashReferenceNumber::parse("ABC1234567890"),
            Err(ReferenceNumberError::NotNumeric)
        );
    }
}
