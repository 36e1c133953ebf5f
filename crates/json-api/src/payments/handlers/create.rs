//! Create Payment Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use canteen_app::domain::payments::instructions::{PaymentInstructions, format_amount};

use crate::{
    extensions::*,
    orders,
    payments::{PaymentResponse, into_status_error},
    state::State,
};

/// Create Payment Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreatePaymentRequest {
    pub order: Uuid,

    /// The stall's GCash number, `09XXXXXXXXX` or `+639XXXXXXXXX`
    pub stall_gcash_number: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentInstructionsResponse {
    pub reference_code: String,

    pub stall_gcash_number: String,

    /// Amount in centavos
    pub amount: u64,

    /// Amount as pesos, e.g. `1,234.50`
    pub amount_display: String,

    pub expires_at: String,

    pub steps: Vec<String>,

    pub notes: Vec<String>,
}

impl From<PaymentInstructions> for PaymentInstructionsResponse {
    fn from(instructions: PaymentInstructions) -> Self {
        Self {
            amount_display: format_amount(instructions.amount),
            reference_code: instructions.reference_code,
            stall_gcash_number: instructions.stall_gcash_number,
            amount: instructions.amount,
            expires_at: instructions.expires_at.to_string(),
            steps: instructions.steps,
            notes: instructions.notes,
        }
    }
}

/// Payment Created Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentCreatedResponse {
    pub payment: PaymentResponse,

    pub instructions: PaymentInstructionsResponse,
}

/// Create Payment Handler
///
/// Opens a GCash payment for the full order total. An order holds at most
/// one open payment at a time.
#[endpoint(
    tags("payments"),
    summary = "Create Payment",
    responses(
        (status_code = StatusCode::CREATED, description = "Payment created"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order is closed or already has an open payment"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid GCash number"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Customer identity required"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreatePaymentRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<PaymentCreatedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let customer = depot.customer_or_401()?;
    let request = json.into_inner();
    let order = request.order.into();

    let owner = state
        .app
        .orders
        .get_order(order)
        .await
        .map_err(orders::into_status_error)?
        .customer;

    if owner != customer.uuid {
        return Err(StatusError::not_found().brief("Order not found"));
    }

    let created = state
        .app
        .payments
        .create_payment(order, request.stall_gcash_number)
        .await
        .map_err(into_status_error)?;

    res.created_at(format!("/payments/{}", created.payment.uuid))?;

    Ok(Json(PaymentCreatedResponse {
        payment: created.payment.into(),
        instructions: created.instructions.into(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use canteen_app::domain::{
        orders::records::{OrderStatus, OrderUuid},
        parties::CustomerUuid,
        payments::{
            PaymentsServiceError,
            data::CreatedPayment,
            records::PaymentUuid,
            state::PaymentStatus,
        },
    };

    use crate::test_helpers::{Mocks, as_customer, make_order, make_payment, service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service(mocks, Router::with_path("payments").post(handler))
    }

    fn expect_order(mocks: &mut Mocks, uuid: OrderUuid, customer: Option<CustomerUuid>) {
        let mut order = make_order(uuid);

        if let Some(customer) = customer {
            order.customer = customer;
        }

        mocks
            .orders
            .expect_get_order()
            .once()
            .withf(move |requested| *requested == uuid)
            .return_once(move |_| Ok(order));
    }

    #[tokio::test]
    async fn test_create_payment_success() -> TestResult {
        let order = OrderUuid::new();
        let uuid = PaymentUuid::new();
        let payment = make_payment(uuid, PaymentStatus::Pending);
        let instructions = PaymentInstructions::for_payment(&payment);

        let mut mocks = Mocks::default();

        expect_order(&mut mocks, order, None);

        mocks
            .payments
            .expect_create_payment()
            .once()
            .withf(move |requested, number| *requested == order && number == "0917 555 0101")
            .return_once(move |_, _| {
                Ok(CreatedPayment {
                    payment,
                    instructions,
                })
            });

        let mut res = as_customer(TestClient::post("http://example.com/payments"))
            .json(&json!({ "order": order.into_uuid(), "stall_gcash_number": "0917 555 0101" }))
            .send(&make_service(mocks))
            .await;

        let body: PaymentCreatedResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/payments/{uuid}").as_str()));
        assert_eq!(body.payment.status, "PENDING");
        assert_eq!(body.instructions.amount, 15_000);
        assert_eq!(body.instructions.amount_display, "150.00");
        assert_eq!(body.instructions.reference_code, body.payment.reference_code);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_second_open_payment_returns_409() {
        let order = OrderUuid::new();

        let mut mocks = Mocks::default();

        expect_order(&mut mocks, order, None);

        mocks
            .payments
            .expect_create_payment()
            .once()
            .return_once(|_, _| {
                Err(PaymentsServiceError::ActivePaymentExists {
                    payment: PaymentUuid::new(),
                })
            });

        let res = as_customer(TestClient::post("http://example.com/payments"))
            .json(&json!({ "order": order.into_uuid(), "stall_gcash_number": "09175550101" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
    }

    #[tokio::test]
    async fn test_create_payment_for_closed_order_returns_409() {
        let order = OrderUuid::new();

        let mut mocks = Mocks::default();

        expect_order(&mut mocks, order, None);

        mocks
            .payments
            .expect_create_payment()
            .once()
            .return_once(|_, _| {
                Err(PaymentsServiceError::OrderClosed {
                    status: OrderStatus::Cancelled,
                })
            });

        let res = as_customer(TestClient::post("http://example.com/payments"))
            .json(&json!({ "order": order.into_uuid(), "stall_gcash_number": "09175550101" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
    }

    #[tokio::test]
    async fn test_create_payment_for_someone_elses_order_returns_404() {
        let order = OrderUuid::new();

        let mut mocks = Mocks::default();

        expect_order(&mut mocks, order, Some(CustomerUuid::new()));

        mocks.payments.expect_create_payment().never();

        let res = as_customer(TestClient::post("http://example.com/payments"))
            .json(&json!({ "order": order.into_uuid(), "stall_gcash_number": "09175550101" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }
}
