//! Per-request span, access log, request id and metrics.

mod parent_context;
mod request_ids;
mod route;

use std::time::Instant;

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, Level, error, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use crate::identity::{CUSTOMER_UUID_HEADER, STAFF_ID_HEADER};

use super::{metrics, settings};

const REQUEST_ID_DEPOT_KEY: &str = "request_id";

/// Paths polled by infrastructure; served without a span or access log.
const QUIET_PATHS: [&str; 2] = ["/metrics", "/healthcheck"];

/// Which gateway identity header the request arrived with. The value itself
/// is resolved and validated later by the identity hoop.
fn caller_kind(req: &Request) -> &'static str {
    if req.headers().contains_key(STAFF_ID_HEADER) {
        "staff"
    } else if req.headers().contains_key(CUSTOMER_UUID_HEADER) {
        "customer"
    } else {
        "anonymous"
    }
}

fn outcome_level(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else {
        Level::INFO
    }
}

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if QUIET_PATHS.contains(&req.uri().path()) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    depot.insert(REQUEST_ID_DEPOT_KEY, request_id.clone());
    request_ids::echo_request_id(res, &request_id);

    let method = req.method().to_string();
    let route = route::route_template(req.uri().path());
    let _in_flight = metrics::InFlightRequestGuard::track();

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        otel.name = %format!("{method} {route}"),
        otel.kind = "server",
        request_id = %request_id,
        method = %method,
        route = %route,
        caller = caller_kind(req),
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );

    if settings::otel_parent_propagation_enabled()
        && let Some(parent) = parent_context::extract_parent_context(req.headers())
        && let Err(source) = span.set_parent(parent)
    {
        warn!("failed to attach upstream trace context: {source}");
    }

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    let elapsed = started.elapsed();
    let status = res.status_code.unwrap_or(StatusCode::OK);
    let duration_ms = elapsed.as_millis();
    let threshold_ms = u128::from(settings::slow_request_threshold_ms());

    metrics::observe_request(&method, &route, status.as_u16(), elapsed.as_secs_f64());

    span.record("status", status.as_u16());
    span.record("duration_ms", duration_ms);

    span.in_scope(|| {
        let level = outcome_level(status);

        if level == Level::ERROR {
            error!(status = status.as_u16(), duration_ms, "request.failed");
        } else if level == Level::WARN {
            warn!(status = status.as_u16(), duration_ms, "request.rejected");
        } else {
            info!(status = status.as_u16(), duration_ms, "request.completed");
        }

        if duration_ms > threshold_ms {
            warn!(duration_ms, threshold_ms, "request.slow");
        }
    });
}
