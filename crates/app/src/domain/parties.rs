//! Parties
//!
//! Customers, stalls and staff are owned by the storefront; the ledger only
//! keeps the identifiers it needs for targeting, ownership and audit.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Storefront customer marker.
#[derive(Debug)]
pub struct CustomerRecord;

/// Customer UUID
pub type CustomerUuid = TypedUuid<CustomerRecord>;

/// Food stall marker.
#[derive(Debug)]
pub struct StallRecord;

/// Stall UUID
pub type StallUuid = TypedUuid<StallRecord>;

/// The buyer as checkout knows them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub uuid: CustomerUuid,
    pub email: String,
}

impl Customer {
    #[must_use]
    pub fn new(uuid: CustomerUuid, email: impl Into<String>) -> Self {
        Self {
            uuid,
            email: email.into(),
        }
    }
}

/// Identifier of the staff member or administrator performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffId(String);

impl StaffId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StaffId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}
