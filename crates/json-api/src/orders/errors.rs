//! Order Errors

use salvo::http::StatusError;
use tracing::error;

use canteen_app::domain::orders::OrdersServiceError;

use crate::{observability, vouchers};

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::AlreadyExists => StatusError::conflict().brief("Order already exists"),
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::InvalidData(reason) => StatusError::bad_request().brief(reason),
        OrdersServiceError::InvalidScan(reason) => {
            StatusError::bad_request().brief(reason.to_string())
        }
        error @ (OrdersServiceError::NotReady { .. }
        | OrdersServiceError::AlreadyCompleted
        | OrdersServiceError::WrongState { .. }) => {
            StatusError::conflict().brief(error.to_string())
        }
        OrdersServiceError::Voucher(source) => vouchers::into_status_error(source),
        OrdersServiceError::RetryExhausted => {
            observability::record_contention("orders");

            StatusError::service_unavailable().brief("Order is busy, try again")
        }
        OrdersServiceError::Store(source) => {
            error!("order storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use canteen_app::domain::{
        orders::{pickup::PickupScanError, records::OrderStatus},
        vouchers::VouchersServiceError,
    };

    use super::*;

    #[test]
    fn voucher_failures_keep_their_own_status() {
        let error = into_status_error(OrdersServiceError::Voucher(
            VouchersServiceError::Exhausted,
        ));

        assert_eq!(error.code, StatusCode::CONFLICT);
    }

    #[test]
    fn pickup_state_errors_are_conflicts() {
        let not_ready = into_status_error(OrdersServiceError::NotReady {
            status: OrderStatus::Preparing,
        });

        assert_eq!(not_ready.code, StatusCode::CONFLICT);
        assert_eq!(
            not_ready.brief,
            "order is not ready for pickup (status: preparing)"
        );

        let scan = into_status_error(OrdersServiceError::InvalidScan(
            PickupScanError::TokenMismatch,
        ));

        assert_eq!(scan.code, StatusCode::BAD_REQUEST);
    }
}
