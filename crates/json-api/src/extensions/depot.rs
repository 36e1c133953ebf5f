//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};

use canteen_app::domain::parties::{Customer, StaffId};

use crate::identity::Caller;

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_caller(&mut self, caller: Caller);

    /// The forwarded caller; anonymous when the gateway sent nothing.
    fn caller(&self) -> Caller;

    fn customer_or_401(&self) -> Result<Customer, StatusError>;

    fn staff_or_401(&self) -> Result<StaffId, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_caller(&mut self, caller: Caller) {
        self.inject(caller);
    }

    fn caller(&self) -> Caller {
        self.obtain::<Caller>()
            .map_or(Caller::Anonymous, Clone::clone)
    }

    fn customer_or_401(&self) -> Result<Customer, StatusError> {
        match self.caller() {
            Caller::Customer(customer) => Ok(customer),
            Caller::Staff(_) | Caller::Anonymous => {
                Err(StatusError::unauthorized().brief("Customer identity required"))
            }
        }
    }

    fn staff_or_401(&self) -> Result<StaffId, StatusError> {
        match self.caller() {
            Caller::Staff(staff) => Ok(staff),
            Caller::Customer(_) | Caller::Anonymous => {
                Err(StatusError::unauthorized().brief("Staff identity required"))
            }
        }
    }
}
