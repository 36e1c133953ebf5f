//! Loyalty Errors

use salvo::http::StatusError;
use tracing::error;

use canteen_app::domain::loyalty::LoyaltyServiceError;

use crate::observability;

pub(crate) fn into_status_error(error: LoyaltyServiceError) -> StatusError {
    match error {
        LoyaltyServiceError::NotFound => {
            StatusError::not_found().brief("Loyalty account not found")
        }
        error @ (LoyaltyServiceError::InvalidAmount | LoyaltyServiceError::InvalidPoints) => {
            StatusError::bad_request().brief(error.to_string())
        }
        error @ LoyaltyServiceError::Insufficient { .. } => {
            StatusError::conflict().brief(error.to_string())
        }
        LoyaltyServiceError::RetryExhausted => {
            observability::record_contention("loyalty");

            StatusError::service_unavailable().brief("Loyalty account is busy, try again")
        }
        LoyaltyServiceError::Store(source) => {
            error!("loyalty storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
