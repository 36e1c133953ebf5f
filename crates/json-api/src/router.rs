//! App Router

use salvo::Router;

use crate::{loyalty, orders, payments, pickups, vouchers};

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(
            Router::with_path("vouchers")
                .post(vouchers::create::handler)
                .push(Router::with_path("preview").post(vouchers::preview::handler))
                .push(Router::with_path("available").get(vouchers::available::handler))
                .push(Router::with_path("{voucher}").get(vouchers::get::handler)),
        )
        .push(
            Router::with_path("loyalty/{customer}")
                .get(loyalty::get::handler)
                .push(Router::with_path("redemptions").post(loyalty::redeem::handler)),
        )
        .push(
            Router::with_path("orders")
                .post(orders::create::handler)
                .push(
                    Router::with_path("{order}")
                        .get(orders::get::handler)
                        .push(Router::with_path("status").post(orders::advance::handler))
                        .push(Router::with_path("cancellation").post(orders::cancel::handler)),
                ),
        )
        .push(
            Router::with_path("payments")
                .post(payments::create::handler)
                .push(
                    Router::with_path("{payment}")
                        .get(payments::get::handler)
                        .push(
                            Router::with_path("reference")
                                .post(payments::submit_reference::handler),
                        )
                        .push(Router::with_path("verification").post(payments::verify::handler))
                        .push(Router::with_path("completion").post(payments::complete::handler))
                        .push(Router::with_path("cancellation").post(payments::cancel::handler))
                        .push(Router::with_path("refund").post(payments::refund::handler))
                        .push(Router::with_path("expiry").post(payments::expire::handler)),
                ),
        )
        .push(Router::with_path("pickups").post(pickups::confirm::handler))
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use canteen_app::{config::LedgerSettings, context::AppContext};

    use crate::{
        identity,
        orders::get::OrderResponse,
        payments::{PaymentOutcomeResponse, PaymentResponse, create::PaymentCreatedResponse},
        state::State,
        test_helpers::{as_customer, as_staff, customer},
        vouchers::{get::VoucherResponse, preview::VoucherPreviewResponse},
    };

    use super::*;

    fn in_memory_service() -> Service {
        let app = AppContext::in_memory(&LedgerSettings::default());

        Service::new(
            Router::new()
                .hoop(inject(State::from_app_context(app)))
                .hoop(identity::handler)
                .push(app_router()),
        )
    }

    #[tokio::test]
    async fn checkout_to_pickup_through_the_api() -> TestResult {
        let service = in_memory_service();
        let stall = uuid::Uuid::now_v7();
        let voucher = uuid::Uuid::now_v7();

        let mut res = as_staff(TestClient::post("http://example.com/vouchers"))
            .json(&serde_json::json!({
                "uuid": voucher,
                "code": "lunch20",
                "discount": { "type": "fixed_amount_off", "amount": 2_000 },
                "min_order_amount": 10_000,
                "valid_from": "2000-01-01T00:00:00Z",
                "valid_until": "2100-01-01T00:00:00Z",
                "max_usage": 5,
            }))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        let created: VoucherResponse = res.take_json().await?;

        assert_eq!(created.code, "LUNCH20");

        let mut res = as_customer(TestClient::post("http://example.com/vouchers/preview"))
            .json(&serde_json::json!({ "code": "lunch20", "stall": stall, "subtotal": 17_000 }))
            .send(&service)
            .await;

        let preview: VoucherPreviewResponse = res.take_json().await?;

        assert_eq!(preview.total, 15_000);

        let order_uuid = uuid::Uuid::now_v7();

        let mut res = as_customer(TestClient::post("http://example.com/orders"))
            .json(&serde_json::json!({
                "uuid": order_uuid,
                "stall": stall,
                "subtotal": 17_000,
                "voucher": {
                    "uuid": voucher,
                    "expected_usage_count": preview.usage_count,
                },
            }))
            .send(&service)
            .await;

        let order: OrderResponse = res.take_json().await?;

        assert_eq!(order.total, 15_000);

        let mut res = as_staff(TestClient::get(format!(
            "http://example.com/vouchers/{voucher}"
        )))
        .send(&service)
        .await;

        let reserved: VoucherResponse = res.take_json().await?;

        assert_eq!(reserved.usage_count, 1);

        let mut res = as_customer(TestClient::post("http://example.com/payments"))
            .json(&serde_json::json!({
                "order": order_uuid,
                "stall_gcash_number": "0917 555 0101",
            }))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        let created: PaymentCreatedResponse = res.take_json().await?;
        let payment = created.payment.uuid;

        assert_eq!(created.instructions.amount, 15_000);
        assert!(created.payment.reference_code.starts_with("GC-"));

        let res = as_customer(TestClient::post(format!(
            "http://example.com/payments/{payment}/reference"
        )))
        .json(&serde_json::json!({
            "reference_number": "1234567890123",
            "customer_gcash_number": "09171234567",
        }))
        .send(&service)
        .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let res = as_staff(TestClient::post(format!(
            "http://example.com/payments/{payment}/verification"
        )))
        .json(&serde_json::json!({ "observed_amount": 14_000 }))
        .send(&service)
        .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        let mut res = as_staff(TestClient::post(format!(
            "http://example.com/payments/{payment}/verification"
        )))
        .json(&serde_json::json!({ "observed_amount": 15_000 }))
        .send(&service)
        .await;

        let verified: PaymentOutcomeResponse = res.take_json().await?;

        assert_eq!(verified.payment.status, "VERIFIED");
        assert_eq!(
            verified.payment.customer_gcash_number.as_deref(),
            Some("0917****567")
        );

        let mut res = as_staff(TestClient::post(format!(
            "http://example.com/payments/{payment}/completion"
        )))
        .send(&service)
        .await;

        let completed: PaymentOutcomeResponse = res.take_json().await?;

        assert_eq!(completed.payment.status, "COMPLETED");

        let mut res = as_customer(TestClient::get(format!(
            "http://example.com/payments/{payment}"
        )))
        .send(&service)
        .await;

        let seen: PaymentResponse = res.take_json().await?;

        assert_eq!(seen.customer_gcash_number.as_deref(), Some("09171234567"));

        for status in ["preparing", "ready"] {
            let res = as_staff(TestClient::post(format!(
                "http://example.com/orders/{order_uuid}/status"
            )))
            .json(&serde_json::json!({ "status": status }))
            .send(&service)
            .await;

            assert_eq!(res.status_code, Some(StatusCode::OK));
        }

        let mut res = as_staff(TestClient::post("http://example.com/pickups"))
            .json(&serde_json::json!({ "scan": order.qr_token }))
            .send(&service)
            .await;

        let picked_up: OrderResponse = res.take_json().await?;

        assert_eq!(picked_up.status, "completed");

        let res = as_staff(TestClient::post("http://example.com/pickups"))
            .json(&serde_json::json!({ "scan": order_uuid.to_string() }))
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        let res = as_customer(TestClient::get(format!(
            "http://example.com/loyalty/{}",
            customer().uuid
        )))
        .send(&service)
        .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }
}
