//! Refund Payment Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    payments::{PaymentOutcomeResponse, into_status_error},
    state::State,
};

/// Refund Payment Handler
///
/// Staff only. Marks a completed payment as refunded; the money itself is
/// returned outside the system.
#[endpoint(
    tags("payments"),
    summary = "Refund Payment",
    responses(
        (status_code = StatusCode::OK, description = "Payment refunded, or already refunded"),
        (status_code = StatusCode::NOT_FOUND, description = "Payment not found"),
        (status_code = StatusCode::CONFLICT, description = "Payment is not completed"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Staff identity required"),
    ),
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PaymentOutcomeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let admin = depot.staff_or_401()?;

    let outcome = state
        .app
        .payments
        .refund_payment(payment.into_inner().into(), admin)
        .await
        .map_err(into_status_error)?;

    Ok(Json(PaymentOutcomeResponse::new(outcome, &depot.caller())))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use canteen_app::domain::payments::{
        PaymentsServiceError, data::PaymentOutcome, records::PaymentUuid, state::PaymentStatus,
    };

    use crate::test_helpers::{Mocks, NOW, STAFF, as_staff, make_payment, service, staff};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service(
            mocks,
            Router::with_path("payments/{payment}/refund").post(handler),
        )
    }

    #[tokio::test]
    async fn test_refund_payment_records_admin() -> TestResult {
        let uuid = PaymentUuid::new();
        let mut refunded = make_payment(uuid, PaymentStatus::Refunded);
        refunded.refunded_at = Some(NOW);
        refunded.refunded_by = Some(staff());

        let mut mocks = Mocks::default();

        mocks
            .payments
            .expect_refund_payment()
            .once()
            .withf(move |requested, admin| *requested == uuid && *admin == staff())
            .return_once(move |_, _| Ok(PaymentOutcome::Transitioned(refunded)));

        let mut res = as_staff(TestClient::post(format!(
            "http://example.com/payments/{uuid}/refund"
        )))
        .send(&make_service(mocks))
        .await;

        let body: PaymentOutcomeResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.payment.status, "REFUNDED");
        assert_eq!(body.payment.refunded_by.as_deref(), Some(STAFF));

        Ok(())
    }

    #[tokio::test]
    async fn test_refund_open_payment_returns_409() {
        let mut mocks = Mocks::default();

        mocks
            .payments
            .expect_refund_payment()
            .once()
            .return_once(|_, _| {
                Err(PaymentsServiceError::WrongState {
                    status: PaymentStatus::Verified,
                })
            });

        let res = as_staff(TestClient::post(format!(
            "http://example.com/payments/{}/refund",
            PaymentUuid::new()
        )))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
    }
}
