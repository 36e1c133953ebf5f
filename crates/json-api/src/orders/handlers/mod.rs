//! Order Handlers

use salvo::http::StatusError;

use canteen_app::domain::orders::records::OrderRecord;

use crate::identity::Caller;

pub(crate) mod advance;
pub(crate) mod cancel;
pub(crate) mod create;
pub(crate) mod get;

/// Staff see every order; customers only their own. Someone else's order
/// reads as missing.
fn authorize(caller: &Caller, order: &OrderRecord) -> Result<(), StatusError> {
    match caller {
        Caller::Staff(_) => Ok(()),
        Caller::Customer(customer) if customer.uuid == order.customer => Ok(()),
        Caller::Customer(_) => Err(StatusError::not_found().brief("Order not found")),
        Caller::Anonymous => Err(StatusError::unauthorized().brief("Identity required")),
    }
}
