use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    trace::{self, RandomIdGenerator, Sampler},
    Resource,
};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("Failed to initialize OpenTelemetry: {0}")]
    OpenTelemetryInit(#[from] opentelemetry::trace::TraceError),
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Initialize structured logging, exporting spans over OTLP when an endpoint is configured
pub fn init_observability(
    service_name: &str,
    service_version: &str,
    otlp_endpoint: Option<&str>,
    enable_json_logging: bool,
    log_level: &str,
) -> Result<(), ObservabilityError> {
    let opentelemetry_layer = match otlp_endpoint {
        Some(endpoint) => Some(OpenTelemetryLayer::new(init_opentelemetry_tracer(
            service_name,
            service_version,
            endpoint,
        )?)),
        None => None,
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(service_name, log_level).into());

    let result = if enable_json_logging {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .with_target(false)
            .with_level(true)
            .with_file(false)
            .with_line_number(false)
            .with_span_events(FmtSpan::NONE);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(opentelemetry_layer)
            .with(fmt_layer)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(opentelemetry_layer)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_span_events(FmtSpan::NONE),
            )
            .try_init()
    };
    result.map_err(|e| ObservabilityError::TracingInit(e.to_string()))?;

    info!(
        otlp_export = otlp_endpoint.is_some(),
        log_level,
        "Observability initialized for {} v{}", service_name, service_version
    );
    Ok(())
}

/// Filter used when `RUST_LOG` is unset: the service logs at `log_level`,
/// the AWS SDK only reports warnings
pub fn default_filter(service_name: &str, log_level: &str) -> String {
    format!(
        "{crate_name}={level},tower_http={level},aws_sdk_dynamodb=warn,aws_config=warn",
        crate_name = service_name.replace('-', "_"),
        level = log_level,
    )
}

/// Trace id of the active span, when it belongs to a sampled trace
pub fn get_current_trace_id() -> Option<String> {
    use opentelemetry::trace::TraceContextExt;
    use tracing_opentelemetry::OpenTelemetrySpanExt;

    let context = tracing::Span::current().context();
    let span_context = context.span().span_context().clone();
    span_context
        .is_valid()
        .then(|| span_context.trace_id().to_string())
}

#[doc(hidden)]
#[macro_export]
macro_rules! traced_event {
    ($level:expr, $($arg:tt)*) => {
        match $crate::observability::tracing::get_current_trace_id() {
            Some(trace_id) => ::tracing::event!($level, trace_id = %trace_id, $($arg)*),
            None => ::tracing::event!($level, $($arg)*),
        }
    };
}

/// `tracing::info!` tagged with the active trace id
#[macro_export]
macro_rules! info_with_trace {
    ($($arg:tt)*) => { $crate::traced_event!(::tracing::Level::INFO, $($arg)*) };
}

#[macro_export]
macro_rules! warn_with_trace {
    ($($arg:tt)*) => { $crate::traced_event!(::tracing::Level::WARN, $($arg)*) };
}

#[macro_export]
macro_rules! error_with_trace {
    ($($arg:tt)*) => { $crate::traced_event!(::tracing::Level::ERROR, $($arg)*) };
}

/// Build the OTLP span exporter pipeline
fn init_opentelemetry_tracer(
    service_name: &str,
    service_version: &str,
    otlp_endpoint: &str,
) -> Result<opentelemetry_sdk::trace::Tracer, ObservabilityError> {
    let resource = Resource::new(vec![
        KeyValue::new("service.name", service_name.to_string()),
        KeyValue::new("service.version", service_version.to_string()),
        KeyValue::new("service.namespace", "pos-menu"),
        KeyValue::new("telemetry.sdk.name", "opentelemetry"),
        KeyValue::new("telemetry.sdk.language", "rust"),
    ]);

    let endpoint = if otlp_endpoint.is_empty() {
        "http://localhost:4317"
    } else {
        otlp_endpoint
    };
    info!("Using OTLP endpoint: {}", endpoint);

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint);

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(
            trace::config()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_max_events_per_span(64)
                .with_max_attributes_per_span(16)
                .with_resource(resource),
        )
        .with_batch_config(
            trace::BatchConfig::default()
                .with_max_queue_size(2048)
                .with_max_export_batch_size(512)
                .with_max_export_timeout(Duration::from_secs(30))
                .with_scheduled_delay(Duration::from_millis(500)),
        )
        .install_batch(opentelemetry_sdk::runtime::Tokio)?;

    Ok(tracer)
}

/// Shutdown observability gracefully with timeout
pub async fn shutdown_observability() {
    info!("Shutting down observability");

    // Flushing pending spans blocks
    let shutdown_task = tokio::task::spawn_blocking(global::shutdown_tracer_provider);

    match tokio::time::timeout(Duration::from_secs(5), shutdown_task).await {
        Ok(Ok(())) => {
            info!("Observability shutdown completed successfully");
        }
        Ok(Err(e)) => {
            warn!("Error during observability shutdown: {}", e);
        }
        Err(_) => {
            warn!("Observability shutdown timed out after 5 seconds");
        }
    }
}
