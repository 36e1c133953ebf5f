//! OTLP trace export.

use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
};

use crate::config::{ServerConfig, observability::OtelConfig};

use super::ObservabilityError;

fn resource(otel: &OtelConfig) -> Resource {
    Resource::builder_empty()
        .with_service_name(otel.service_name.clone())
        .with_attributes([
            KeyValue::new("service.namespace", "canteen"),
            KeyValue::new("service.version", otel.service_version.clone()),
            KeyValue::new("deployment.environment.name", otel.environment.clone()),
        ])
        .build()
}

/// Sample new root traces at the configured ratio and follow the gateway's
/// decision for traces it started.
fn sampler(otel: &OtelConfig) -> Sampler {
    Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(otel.sample_ratio)))
}

pub(super) fn build_tracer_provider(
    config: &ServerConfig,
) -> Result<SdkTracerProvider, ObservabilityError> {
    let otel = &config.observability.otel;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(otel.endpoint.clone())
        .with_timeout(Duration::from_secs(otel.timeout_seconds))
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_sampler(sampler(otel))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource(otel))
        .with_batch_exporter(exporter)
        .build())
}
