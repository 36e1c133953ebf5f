//! Voucher Errors

use salvo::http::StatusError;
use tracing::error;

use canteen_app::domain::vouchers::VouchersServiceError;

use crate::observability;

pub(crate) fn into_status_error(error: VouchersServiceError) -> StatusError {
    match error {
        VouchersServiceError::AlreadyExists => {
            StatusError::conflict().brief("Voucher code already exists")
        }
        VouchersServiceError::NotFound => StatusError::not_found().brief("Voucher not found"),
        VouchersServiceError::InvalidData(reason) => StatusError::bad_request().brief(reason),
        VouchersServiceError::NotRedeemable(reason) => {
            StatusError::unprocessable_entity().brief(reason.to_string())
        }
        VouchersServiceError::Exhausted => StatusError::conflict().brief("Voucher has no uses left"),
        VouchersServiceError::RetryExhausted => {
            observability::record_contention("vouchers");

            StatusError::service_unavailable().brief("Voucher is busy, try again")
        }
        VouchersServiceError::Store(source) => {
            error!("voucher storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
