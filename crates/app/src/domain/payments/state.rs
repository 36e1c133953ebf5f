//! Payment Status
//!
//! ```text
//! PENDING -> AWAITING_VERIFICATION -> VERIFIED -> COMPLETED -> REFUNDED
//!    |               |                   |
//!    +---------------+--> FAILED         |
//!    +---------------+-------------------+--> EXPIRED (once past expires_at)
//! ```
//!
//! Terminal states never move again, except an administrative refund of a
//! completed payment.

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    AwaitingVerification,
    Verified,
    Completed,
    Failed,
    Expired,
    Refunded,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::AwaitingVerification => "AWAITING_VERIFICATION",
            Self::Verified => "VERIFIED",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Expired => "EXPIRED",
            Self::Refunded => "REFUNDED",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Expired | Self::Refunded
        )
    }

    /// Whether `self -> next` is an edge of the lifecycle graph.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::AwaitingVerification)
                | (Self::AwaitingVerification, Self::Verified)
                | (Self::Verified, Self::Completed)
                | (Self::Pending | Self::AwaitingVerification, Self::Failed)
                | (
                    Self::Pending | Self::AwaitingVerification | Self::Verified,
                    Self::Expired
                )
                | (Self::Completed, Self::Refunded)
        )
    }

    /// The status as of `now`: a non-terminal payment past its deadline reads
    /// as expired whether or not that has been written yet.
    #[must_use]
    pub fn effective(self, expires_at: Timestamp, now: Timestamp) -> Self {
        if !self.is_terminal() && now > expires_at {
            Self::Expired
        } else {
            self
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
