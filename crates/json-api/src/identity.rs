//! Caller identity forwarded by the storefront gateway.
//!
//! The gateway authenticates users and forwards who they are in headers. The
//! ledger trusts those headers and only uses them for masking, audit fields
//! and ownership checks.

use salvo::prelude::*;

use canteen_app::domain::{
    parties::{Customer, CustomerUuid, StaffId},
    payments::data::Viewer,
};

use crate::extensions::*;

pub(crate) const CUSTOMER_UUID_HEADER: &str = "x-customer-uuid";
pub(crate) const CUSTOMER_EMAIL_HEADER: &str = "x-customer-email";
pub(crate) const STAFF_ID_HEADER: &str = "x-staff-id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Caller {
    Customer(Customer),
    Staff(StaffId),
    Anonymous,
}

impl Caller {
    pub(crate) fn viewer(&self) -> Viewer {
        match self {
            Self::Customer(customer) => Viewer::Customer(customer.uuid),
            Self::Staff(staff) => Viewer::Staff(staff.clone()),
            Self::Anonymous => Viewer::Anonymous,
        }
    }
}

fn header(req: &Request, name: &str) -> Option<String> {
    req.header::<String>(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn resolve(req: &Request) -> Result<Caller, StatusError> {
    let customer = header(req, CUSTOMER_UUID_HEADER);
    let staff = header(req, STAFF_ID_HEADER);

    match (customer, staff) {
        (Some(_), Some(_)) => {
            Err(StatusError::bad_request().brief("Send either a customer or a staff identity"))
        }
        (Some(uuid), None) => {
            let uuid: CustomerUuid = uuid
                .parse()
                .map_err(|_ignored| StatusError::bad_request().brief("Malformed customer UUID"))?;

            let email = header(req, CUSTOMER_EMAIL_HEADER).unwrap_or_default();

            Ok(Caller::Customer(Customer::new(uuid, email)))
        }
        (None, Some(staff)) => Ok(Caller::Staff(StaffId::new(staff))),
        (None, None) => Ok(Caller::Anonymous),
    }
}

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    match resolve(req) {
        Ok(caller) => {
            depot.insert_caller(caller);

            ctrl.call_next(req, depot, res).await;
        }
        Err(error) => {
            res.render(error);
            ctrl.skip_rest();
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use super::*;

    #[salvo::handler]
    async fn echo_caller(depot: &mut Depot, res: &mut Response) {
        let caller = match depot.caller() {
            Caller::Customer(customer) => format!("customer:{}:{}", customer.uuid, customer.email),
            Caller::Staff(staff) => format!("staff:{staff}"),
            Caller::Anonymous => "anonymous".to_owned(),
        };

        res.render(caller);
    }

    fn make_service() -> Service {
        Service::new(Router::new().hoop(handler).push(Router::new().get(echo_caller)))
    }

    #[tokio::test]
    async fn no_headers_is_anonymous() -> TestResult {
        let body = TestClient::get("http://example.com/")
            .send(&make_service())
            .await
            .take_string()
            .await?;

        assert_eq!(body, "anonymous");

        Ok(())
    }

    #[tokio::test]
    async fn customer_headers_become_a_customer() -> TestResult {
        let uuid = CustomerUuid::new();

        let body = TestClient::get("http://example.com/")
            .add_header(CUSTOMER_UUID_HEADER, uuid.to_string(), true)
            .add_header(CUSTOMER_EMAIL_HEADER, "ana@campus.edu", true)
            .send(&make_service())
            .await
            .take_string()
            .await?;

        assert_eq!(body, format!("customer:{uuid}:ana@campus.edu"));

        Ok(())
    }

    #[tokio::test]
    async fn staff_header_becomes_staff() -> TestResult {
        let body = TestClient::get("http://example.com/")
            .add_header(STAFF_ID_HEADER, "counter-2", true)
            .send(&make_service())
            .await
            .take_string()
            .await?;

        assert_eq!(body, "staff:counter-2");

        Ok(())
    }

    #[tokio::test]
    async fn malformed_customer_uuid_returns_400() {
        let res = TestClient::get("http://example.com/")
            .add_header(CUSTOMER_UUID_HEADER, "not-a-uuid", true)
            .send(&make_service())
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn both_identities_return_400() {
        let res = TestClient::get("http://example.com/")
            .add_header(CUSTOMER_UUID_HEADER, CustomerUuid::new().to_string(), true)
            .add_header(STAFF_ID_HEADER, "counter-2", true)
            .send(&make_service())
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
