//! Complete Payment Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    payments::{PaymentOutcomeResponse, into_status_error},
    state::State,
};

/// Complete Payment Handler
///
/// Staff only. Closes a verified payment; the order's voucher use is
/// committed and loyalty points are credited.
#[endpoint(
    tags("payments"),
    summary = "Complete Payment",
    responses(
        (status_code = StatusCode::OK, description = "Payment completed, or already finished"),
        (status_code = StatusCode::NOT_FOUND, description = "Payment not found"),
        (status_code = StatusCode::CONFLICT, description = "Payment is not verified"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Staff identity required"),
    ),
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PaymentOutcomeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    depot.staff_or_401()?;

    let outcome = state
        .app
        .payments
        .complete_payment(payment.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(PaymentOutcomeResponse::new(outcome, &depot.caller())))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use canteen_app::domain::payments::{
        data::PaymentOutcome, records::PaymentUuid, state::PaymentStatus,
    };

    use crate::test_helpers::{Mocks, as_staff, make_payment, service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service(
            mocks,
            Router::with_path("payments/{payment}/completion").post(handler),
        )
    }

    #[tokio::test]
    async fn test_complete_payment_success() -> TestResult {
        let uuid = PaymentUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .payments
            .expect_complete_payment()
            .once()
            .withf(move |requested| *requested == uuid)
            .return_once(move |_| {
                Ok(PaymentOutcome::Transitioned(make_payment(
                    uuid,
                    PaymentStatus::Completed,
                )))
            });

        let mut res = as_staff(TestClient::post(format!(
            "http://example.com/payments/{uuid}/completion"
        )))
        .send(&make_service(mocks))
        .await;

        let body: PaymentOutcomeResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.transitioned);
        assert_eq!(body.payment.status, "COMPLETED");

        Ok(())
    }

    #[tokio::test]
    async fn test_completing_twice_is_unchanged() -> TestResult {
        let uuid = PaymentUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .payments
            .expect_complete_payment()
            .once()
            .return_once(move |_| {
                Ok(PaymentOutcome::Unchanged(make_payment(
                    uuid,
                    PaymentStatus::Completed,
                )))
            });

        let mut res = as_staff(TestClient::post(format!(
            "http://example.com/payments/{uuid}/completion"
        )))
        .send(&make_service(mocks))
        .await;

        let body: PaymentOutcomeResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(!body.transitioned);

        Ok(())
    }
}
