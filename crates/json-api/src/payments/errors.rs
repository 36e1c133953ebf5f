//! Payment Errors

use salvo::http::StatusError;
use tracing::error;

use canteen_app::domain::payments::PaymentsServiceError;

use crate::{observability, orders};

pub(crate) fn into_status_error(error: PaymentsServiceError) -> StatusError {
    match error {
        PaymentsServiceError::NotFound => StatusError::not_found().brief("Payment not found"),
        PaymentsServiceError::OrderNotFound => StatusError::not_found().brief("Order not found"),
        error @ (PaymentsServiceError::OrderClosed { .. }
        | PaymentsServiceError::ActivePaymentExists { .. }
        | PaymentsServiceError::WrongState { .. }) => {
            StatusError::conflict().brief(error.to_string())
        }
        error @ PaymentsServiceError::AmountMismatch { .. } => {
            StatusError::unprocessable_entity().brief(error.to_string())
        }
        PaymentsServiceError::InvalidReferenceNumber(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        PaymentsServiceError::InvalidPhoneNumber(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        PaymentsServiceError::Order(source) => orders::into_status_error(source),
        PaymentsServiceError::RetryExhausted => {
            observability::record_contention("payments");

            StatusError::service_unavailable().brief("Payment is busy, try again")
        }
        PaymentsServiceError::Store(source) => {
            error!("payment storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use canteen_app::domain::payments::{records::PaymentUuid, state::PaymentStatus};

    use super::*;

    #[test]
    fn amount_mismatch_names_both_amounts() {
        let error = into_status_error(PaymentsServiceError::AmountMismatch {
            expected: 15_000,
            observed: 14_000,
        });

        assert_eq!(error.code, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(error.brief.contains("15000"), "{}", error.brief);
        assert!(error.brief.contains("14000"), "{}", error.brief);
    }

    #[test]
    fn lifecycle_conflicts_map_to_409() {
        let wrong_state = into_status_error(PaymentsServiceError::WrongState {
            status: PaymentStatus::Pending,
        });
        let slot_taken = into_status_error(PaymentsServiceError::ActivePaymentExists {
            payment: PaymentUuid::new(),
        });

        assert_eq!(wrong_state.code, StatusCode::CONFLICT);
        assert_eq!(slot_taken.code, StatusCode::CONFLICT);
    }
}
