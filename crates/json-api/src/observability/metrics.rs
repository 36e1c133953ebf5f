//! Prometheus metrics for HTTP traffic and ledger outcomes, exposed at
//! `/metrics`.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

const DURATION_BUCKETS: [f64; 11] = [
    0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

#[derive(Debug)]
struct CanteenMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    ledger_contention_total: IntCounterVec,
    payment_transitions_total: IntCounterVec,
}

static METRICS: OnceLock<Option<CanteenMetrics>> = OnceLock::new();

/// Holds the in-flight gauge up for the lifetime of one request.
#[derive(Debug)]
pub(super) struct InFlightRequestGuard {
    tracked: bool,
}

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        let Some(metrics) = metrics() else {
            return Self { tracked: false };
        };

        metrics.requests_in_flight.inc();

        Self { tracked: true }
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if self.tracked
            && let Some(metrics) = metrics()
        {
            metrics.requests_in_flight.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status_code = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_code.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Count a ledger write that gave up after every conditional retry lost.
pub(crate) fn record_contention(ledger: &str) {
    if let Some(metrics) = metrics() {
        metrics
            .ledger_contention_total
            .with_label_values(&[ledger])
            .inc();
    }
}

/// Count a payment moving into `status`.
pub(crate) fn record_payment_transition(status: &str) {
    if let Some(metrics) = metrics() {
        metrics
            .payment_transitions_total
            .with_label_values(&[status])
            .inc();
    }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metrics.registry.gather(), &mut encoded) {
        error!("failed to encode metrics: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    match HeaderValue::from_str(encoder.format_type()) {
        Ok(content_type) => {
            res.headers_mut().insert(CONTENT_TYPE, content_type);
            res.render(String::from_utf8_lossy(&encoded).into_owned());
        }
        Err(source) => {
            error!("invalid metrics content type: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn metrics() -> Option<&'static CanteenMetrics> {
    METRICS.get_or_init(build_metrics).as_ref()
}

fn register<C>(registry: &Registry, name: &str, collector: prometheus::Result<C>) -> Option<C>
where
    C: Collector + Clone + 'static,
{
    let collector = match collector {
        Ok(collector) => collector,
        Err(source) => {
            error!("failed to create {name} metric: {source}");
            return None;
        }
    };

    if let Err(source) = registry.register(Box::new(collector.clone())) {
        error!("failed to register {name} metric: {source}");
        return None;
    }

    Some(collector)
}

fn build_metrics() -> Option<CanteenMetrics> {
    let registry = match Registry::new_custom(Some("canteen".to_owned()), None) {
        Ok(registry) => registry,
        Err(source) => {
            error!("failed to create metrics registry: {source}");
            return None;
        }
    };

    let requests_total = register(
        &registry,
        "http_requests_total",
        IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests by method, route and status."),
            &["method", "route", "status_code"],
        ),
    )?;

    let request_duration_seconds = register(
        &registry,
        "http_request_duration_seconds",
        HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency by method and route.",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["method", "route"],
        ),
    )?;

    let requests_in_flight = register(
        &registry,
        "http_requests_in_flight",
        IntGauge::new("http_requests_in_flight", "HTTP requests being served."),
    )?;

    let ledger_contention_total = register(
        &registry,
        "ledger_contention_total",
        IntCounterVec::new(
            Opts::new(
                "ledger_contention_total",
                "Ledger writes abandoned after exhausting conditional retries.",
            ),
            &["ledger"],
        ),
    )?;

    let payment_transitions_total = register(
        &registry,
        "payment_transitions_total",
        IntCounterVec::new(
            Opts::new(
                "payment_transitions_total",
                "Payment state changes by destination status.",
            ),
            &["status"],
        ),
    )?;

    Some(CanteenMetrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        ledger_contention_total,
        payment_transitions_total,
    })
}
