//! Simple metrics module for the reporting pipeline
//!
//! This module provides a straightforward API for recording metrics using
//! the standard Prometheus naming conventions.

use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::info;

/// Enum representing all metric names used in the system
/// This eliminates magic strings and provides compile-time safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Heartbeat
    Heartbeat,

    // Catalog metrics
    CatalogSpecLoadsSuccess,
    CatalogSpecLoadsError,
    CatalogTableRows,
    CatalogTableLoadDuration,
    CatalogArtifactsWritten,
    CatalogArtifactBytes,

    // Node metrics
    NodesSuccess,
    NodesError,
    NodeDuration,

    // Run metrics
    RunsTotal,
    RunDuration,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::Heartbeat => "fare_heartbeat_total",

            MetricName::CatalogSpecLoadsSuccess => "fare_catalog_spec_loads_success_total",
            MetricName::CatalogSpecLoadsError => "fare_catalog_spec_loads_error_total",
            MetricName::CatalogTableRows => "fare_catalog_table_rows",
            MetricName::CatalogTableLoadDuration => "fare_catalog_table_load_duration_seconds",
            MetricName::CatalogArtifactsWritten => "fare_catalog_artifacts_written_total",
            MetricName::CatalogArtifactBytes => "fare_catalog_artifact_bytes",

            MetricName::NodesSuccess => "fare_nodes_success_total",
            MetricName::NodesError => "fare_nodes_error_total",
            MetricName::NodeDuration => "fare_node_duration_seconds",

            MetricName::RunsTotal => "fare_runs_total",
            MetricName::RunDuration => "fare_run_duration_seconds",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Initialize the metrics system with optional push gateway support
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    init_with_push_options(None, None)
}

/// Initialize with push gateway configuration
pub fn init_with_push_options(
    job_name: Option<&str>,
    instance: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();

    // Install the recorder and get the handle
    let handle = builder
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;

    // If push gateway is configured, store the handle for later pushing
    if let Ok(pushgateway_url) = std::env::var("FARE_PUSHGATEWAY_URL") {
        let job = job_name.unwrap_or("fare_reporting");
        let inst = instance.unwrap_or("default");

        METRICS_HANDLE
            .set(Arc::new(MetricsState {
                handle,
                pushgateway_url,
                job: job.to_string(),
                instance: inst.to_string(),
            }))
            .ok();

        info!("Metrics system initialized with push gateway support");
    } else {
        info!("Metrics system initialized (no push gateway)");
    }

    Ok(())
}

// Global state for metrics pushing
static METRICS_HANDLE: OnceLock<Arc<MetricsState>> = OnceLock::new();

struct MetricsState {
    handle: metrics_exporter_prometheus::PrometheusHandle,
    pushgateway_url: String,
    job: String,
    instance: String,
}

/// Get access to the rendered metrics for inspection
#[allow(dead_code)]
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|state| state.handle.render())
}

/// Internal function to push a single metric immediately
async fn push_single_metric(
    name: &str,
    value: f64,
    metric_type: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(state) = METRICS_HANDLE.get() {
        let push_url = format!(
            "{}/metrics/job/{}/instance/{}",
            state.pushgateway_url.trim_end_matches('/'),
            state.job,
            state.instance
        );

        let metrics_text = format!("# TYPE {} {}\n{} {}\n", name, metric_type, name, value);

        let client = reqwest::Client::new();
        let _ = client
            .post(&push_url)
            .header("Content-Type", "text/plain; version=0.0.4")
            .body(metrics_text)
            .send()
            .await?;
    }
    Ok(())
}

/// Spawn a push for one metric when a push gateway is configured and a
/// runtime is available; recording the metric itself never depends on this.
fn push_async(name: &'static str, value: f64, metric_type: &'static str) {
    if METRICS_HANDLE.get().is_none() {
        return;
    }
    if let Ok(rt) = tokio::runtime::Handle::try_current() {
        rt.spawn(async move {
            let _ = push_single_metric(name, value, metric_type).await;
        });
    }
}

/// Record a heartbeat
pub fn heartbeat() {
    let name = MetricName::Heartbeat.as_str();
    ::metrics::counter!(name).increment(1);
    push_async(name, 1.0, "counter");
}

pub mod catalog {
    use super::{push_async, MetricName};

    /// Record a successful dataset spec load
    pub fn spec_load_success() {
        let name = MetricName::CatalogSpecLoadsSuccess.as_str();
        ::metrics::counter!(name).increment(1);
        push_async(name, 1.0, "counter");
    }

    /// Record a failed dataset spec load
    pub fn spec_load_error() {
        let name = MetricName::CatalogSpecLoadsError.as_str();
        ::metrics::counter!(name).increment(1);
        push_async(name, 1.0, "counter");
    }

    /// Record how many rows the input table carried
    pub fn table_rows(rows: usize) {
        let value = rows as f64;
        let name = MetricName::CatalogTableRows.as_str();
        ::metrics::histogram!(name).record(value);
        push_async(name, value, "gauge");
    }

    /// Record table load duration
    pub fn table_load_duration(secs: f64) {
        let name = MetricName::CatalogTableLoadDuration.as_str();
        ::metrics::histogram!(name).record(secs);
        push_async(name, secs, "gauge");
    }

    /// Record a written artifact and its size
    pub fn artifact_written(bytes: usize) {
        let written = MetricName::CatalogArtifactsWritten.as_str();
        ::metrics::counter!(written).increment(1);
        push_async(written, 1.0, "counter");

        let size = MetricName::CatalogArtifactBytes.as_str();
        ::metrics::histogram!(size).record(bytes as f64);
        push_async(size, bytes as f64, "gauge");
    }
}

pub mod nodes {
    use super::{push_async, MetricName};

    /// Record a successful node run
    pub fn success(node: &str) {
        let name = MetricName::NodesSuccess.as_str();
        ::metrics::counter!(name, "node" => node.to_string()).increment(1);
        push_async(name, 1.0, "counter");
    }

    /// Record a failed node run
    pub fn error(node: &str) {
        let name = MetricName::NodesError.as_str();
        ::metrics::counter!(name, "node" => node.to_string()).increment(1);
        push_async(name, 1.0, "counter");
    }

    /// Record node execution duration
    pub fn duration(node: &str, secs: f64) {
        let name = MetricName::NodeDuration.as_str();
        ::metrics::histogram!(name, "node" => node.to_string()).record(secs);
        push_async(name, secs, "gauge");
    }
}

pub mod runs {
    use super::{push_async, MetricName};

    /// Count a pipeline run
    pub fn started() {
        let name = MetricName::RunsTotal.as_str();
        ::metrics::counter!(name).increment(1);
        push_async(name, 1.0, "counter");
    }

    /// Record total pipeline run duration
    pub fn duration(secs: f64) {
        let name = MetricName::RunDuration.as_str();
        ::metrics::histogram!(name).record(secs);
        push_async(name, secs, "gauge");
    }
}
