use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to register metric: {0}")]
    Registration(#[from] prometheus::Error),
    #[error("Failed to encode metrics: {0}")]
    Encoding(String),
}

/// Prometheus metrics for the menu catalog service
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,

    // HTTP metrics
    pub http_requests_total: CounterVec,
    pub http_request_duration_seconds: HistogramVec,
    pub http_requests_in_flight: GaugeVec,

    // Remote table metrics
    pub remote_operations_total: CounterVec,
    pub remote_operation_duration_seconds: HistogramVec,

    // Catalog metrics
    pub catalog_operations_total: CounterVec,
    pub catalog_entries: GaugeVec,
}

fn status_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}

impl Metrics {
    /// Create a new metrics instance with all metrics registered
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        info!("Initializing Prometheus metrics");

        let http_requests_total = CounterVec::new(
            Opts::new(
                "http_requests_total",
                "Total number of HTTP requests processed",
            ),
            &["method", "endpoint", "status_code"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "endpoint"],
        )?;

        let http_requests_in_flight = GaugeVec::new(
            Opts::new(
                "http_requests_in_flight",
                "Number of HTTP requests currently being processed",
            ),
            &["method", "endpoint"],
        )?;

        let remote_operations_total = CounterVec::new(
            Opts::new(
                "remote_operations_total",
                "Total number of calls made to the remote catalog tables",
            ),
            &["operation", "table", "status"],
        )?;

        let remote_operation_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "remote_operation_duration_seconds",
                "Remote catalog table call duration in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
            ]),
            &["operation", "table"],
        )?;

        let catalog_operations_total = CounterVec::new(
            Opts::new(
                "catalog_operations_total",
                "Total number of catalog store operations",
            ),
            &["operation", "status"],
        )?;

        let catalog_entries = GaugeVec::new(
            Opts::new(
                "catalog_entries",
                "Number of entries cached in each catalog collection",
            ),
            &["table"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(remote_operations_total.clone()))?;
        registry.register(Box::new(remote_operation_duration_seconds.clone()))?;
        registry.register(Box::new(catalog_operations_total.clone()))?;
        registry.register(Box::new(catalog_entries.clone()))?;

        info!("Prometheus metrics initialized successfully");

        Ok(Metrics {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            remote_operations_total,
            remote_operation_duration_seconds,
            catalog_operations_total,
            catalog_entries,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encode all metrics in Prometheus text format
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::Encoding(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| MetricsError::Encoding(e.to_string()))
    }

    pub fn record_http_request(
        &self,
        method: &str,
        endpoint: &str,
        status_code: u16,
        duration_seconds: f64,
    ) {
        let status_str = status_code.to_string();

        self.http_requests_total
            .with_label_values(&[method, endpoint, &status_str])
            .inc();

        self.http_request_duration_seconds
            .with_label_values(&[method, endpoint])
            .observe(duration_seconds);
    }

    /// Record one call to a remote catalog table
    pub fn record_remote_operation(
        &self,
        operation: &str,
        table: &str,
        success: bool,
        duration_seconds: f64,
    ) {
        self.remote_operations_total
            .with_label_values(&[operation, table, status_label(success)])
            .inc();

        self.remote_operation_duration_seconds
            .with_label_values(&[operation, table])
            .observe(duration_seconds);
    }

    /// Record the outcome of a store operation such as `add_meal`
    pub fn record_catalog_operation(&self, operation: &str, success: bool) {
        self.catalog_operations_total
            .with_label_values(&[operation, status_label(success)])
            .inc();
    }

    pub fn set_catalog_entries(&self, table: &str, count: usize) {
        self.catalog_entries
            .with_label_values(&[table])
            .set(count as f64);
    }

    pub fn increment_in_flight(&self, method: &str, endpoint: &str) {
        self.http_requests_in_flight
            .with_label_values(&[method, endpoint])
            .inc();
    }

    pub fn decrement_in_flight(&self, method: &str, endpoint: &str) {
        self.http_requests_in_flight
            .with_label_values(&[method, endpoint])
            .dec();
    }
}
