use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::TraceContextExt;
use std::{sync::Arc, time::Instant};
use tracing::{error, info, instrument, Instrument};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use super::Metrics;

/// Middleware for request tracing and HTTP metrics
pub async fn observability_middleware(
    metrics: Arc<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let uri = request.uri().to_string();

    let user_agent = request
        .headers()
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    // Group by route template so entry ids don't explode the label set
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched_path| matched_path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let span_name = format!("{} {}", method, endpoint);

    let span = tracing::info_span!(
        target: "menucatalog_rs::http",
        "{}", span_name,
        otel.name = %span_name,
        otel.kind = "server",
        http.method = %method,
        http.route = %endpoint,
        http.url = %uri,
        http.user_agent = %user_agent,
        http.status_code = tracing::field::Empty,
        http.response_time_ms = tracing::field::Empty,
    );

    async {
        metrics.increment_in_flight(&method, &endpoint);

        let trace_id = tracing::Span::current()
            .context()
            .span()
            .span_context()
            .trace_id()
            .to_string();

        info!(trace_id = %trace_id, method = %method, path = %endpoint, "Processing request");

        let response = next.run(request).await;

        let duration = start_time.elapsed();
        let duration_ms = duration.as_millis();
        let status_code = response.status().as_u16();

        tracing::Span::current().record("http.status_code", status_code);
        tracing::Span::current().record("http.response_time_ms", duration_ms);

        let current_span = tracing::Span::current();
        let span_context = current_span.context();
        let otel_span = span_context.span();
        if status_code >= 400 {
            otel_span.set_status(opentelemetry::trace::Status::error("HTTP error"));
        } else {
            otel_span.set_status(opentelemetry::trace::Status::Ok);
        }

        metrics.record_http_request(&method, &endpoint, status_code, duration.as_secs_f64());
        metrics.decrement_in_flight(&method, &endpoint);

        if status_code >= 400 {
            error!(
                trace_id = %trace_id,
                method = %method,
                path = %endpoint,
                status_code = status_code,
                duration_ms = duration_ms,
                "Request completed with error"
            );
        } else {
            info!(
                trace_id = %trace_id,
                method = %method,
                path = %endpoint,
                status_code = status_code,
                duration_ms = duration_ms,
                "Request completed successfully"
            );
        }

        response
    }
    .instrument(span)
    .await
}

/// Times calls to the remote catalog tables and records their outcome
#[derive(Clone)]
pub struct RemoteCallTracer {
    metrics: Arc<Metrics>,
}

impl RemoteCallTracer {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }

    #[instrument(skip_all, fields(operation = %operation, table = %table))]
    pub async fn trace_operation<F, T, E>(
        &self,
        operation: &str,
        table: &str,
        future: F,
    ) -> Result<T, E>
    where
        F: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let start_time = Instant::now();

        let result = future.await;
        let duration = start_time.elapsed();
        self.metrics.record_remote_operation(
            operation,
            table,
            result.is_ok(),
            duration.as_secs_f64(),
        );

        match &result {
            Ok(_) => info!(
                duration_ms = duration.as_millis(),
                "Remote operation completed successfully"
            ),
            Err(error) => error!(
                error = %error,
                duration_ms = duration.as_millis(),
                "Remote operation failed"
            ),
        }

        result
    }

    pub fn record_catalog_operation(&self, operation: &str, success: bool) {
        self.metrics.record_catalog_operation(operation, success);
    }

    pub fn set_catalog_entries(&self, table: &str, count: usize) {
        self.metrics.set_catalog_entries(table, count);
    }
}
