use crate::catalog::{ArtifactRecord, DataCatalog};
use crate::charts::ChartOptions;
use crate::error::Result;
use crate::pipeline::node::Pipeline;
use crate::table::ModelInputTable;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Ok,
    Failed,
}

/// Per-node entry in the run manifest
#[derive(Debug, Clone, Serialize)]
pub struct NodeOutcome {
    pub func_name: String,
    pub input: String,
    pub output: String,
    pub status: NodeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactRecord>,
    pub duration_secs: f64,
}

/// Persisted record of a complete pipeline run
#[derive(Debug, Serialize)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub nodes: Vec<NodeOutcome>,
}

/// Result of a complete pipeline run
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub nodes_total: usize,
    pub nodes_succeeded: usize,
    pub errors: Vec<String>,
    pub artifacts: Vec<ArtifactRecord>,
    pub manifest_path: String,
    pub duration_secs: f64,
}

/// Run a declared pipeline against the catalog. Node failures are collected
/// into the summary; the run itself only fails when an input dataset cannot
/// be loaded or the manifest cannot be written.
pub async fn run_pipeline(
    pipeline: &Pipeline,
    catalog: &DataCatalog,
    options: &ChartOptions,
    output_dir: &Path,
) -> Result<RunSummary> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!("🚀 Starting reporting pipeline run {}", run_id);
    println!("🚀 Starting reporting pipeline run {}", run_id);
    crate::observability::metrics::runs::started();
    let t_run = std::time::Instant::now();

    // Every node in this pipeline reads the same table; load each distinct
    // input once
    let mut tables: HashMap<&str, ModelInputTable> = HashMap::new();
    for input in pipeline.inputs() {
        let table = catalog.load_table(input)?;
        println!("📥 Loaded {} ({} rows)", input, table.len());
        tables.insert(input, table);
    }

    let mut outcomes = Vec::new();
    let mut errors = Vec::new();
    let mut artifacts = Vec::new();

    for node in pipeline.nodes() {
        info!("🔧 Running node {}", node.func_name());
        println!(
            "🔧 Running node {} ({} -> {})",
            node.func_name(),
            node.input(),
            node.output()
        );
        let t_node = std::time::Instant::now();

        let table = &tables[node.input()];
        let result = node
            .run(table, options)
            .and_then(|plot| catalog.save_chart(node.output(), &plot));
        let duration_secs = t_node.elapsed().as_secs_f64();
        crate::observability::metrics::nodes::duration(node.func_name(), duration_secs);

        match result {
            Ok(artifact) => {
                crate::observability::metrics::nodes::success(node.func_name());
                println!("✅ {} -> {}", node.func_name(), artifact.path);
                artifacts.push(artifact.clone());
                outcomes.push(NodeOutcome {
                    func_name: node.func_name().to_string(),
                    input: node.input().to_string(),
                    output: node.output().to_string(),
                    status: NodeStatus::Ok,
                    error: None,
                    artifact: Some(artifact),
                    duration_secs,
                });
            }
            Err(e) => {
                crate::observability::metrics::nodes::error(node.func_name());
                let message = format!("Node {} failed: {}", node.func_name(), e);
                error!("{}", message);
                println!("⚠️  {}", message);
                errors.push(message.clone());
                outcomes.push(NodeOutcome {
                    func_name: node.func_name().to_string(),
                    input: node.input().to_string(),
                    output: node.output().to_string(),
                    status: NodeStatus::Failed,
                    error: Some(message),
                    artifact: None,
                    duration_secs,
                });
            }
        }
    }

    let finished_at = Utc::now();
    let manifest = RunManifest {
        run_id,
        started_at,
        finished_at,
        nodes: outcomes,
    };
    let manifest_path = persist_manifest(&manifest, output_dir)?;
    info!("💾 Saved run manifest to {}", manifest_path);
    println!("💾 Saved run manifest to {}", manifest_path);

    let duration_secs = t_run.elapsed().as_secs_f64();
    crate::observability::metrics::runs::duration(duration_secs);

    let nodes_succeeded = manifest
        .nodes
        .iter()
        .filter(|n| n.status == NodeStatus::Ok)
        .count();

    // Push a minimal metrics snapshot to Pushgateway if configured
    push_pushgateway_snapshot(nodes_succeeded, errors.len(), duration_secs).await;

    Ok(RunSummary {
        run_id,
        nodes_total: pipeline.len(),
        nodes_succeeded,
        errors,
        artifacts,
        manifest_path,
        duration_secs,
    })
}

/// Persist the run manifest to a timestamped JSON file
fn persist_manifest(manifest: &RunManifest, output_dir: &Path) -> Result<String> {
    fs::create_dir_all(output_dir)?;

    let timestamp = manifest.started_at.format("%Y%m%d_%H%M%S");
    let filename = format!("run_manifest_{}.json", timestamp);
    let filepath = output_dir.join(filename);

    let json_content = serde_json::to_string_pretty(manifest)?;
    fs::write(&filepath, json_content)?;

    Ok(filepath.to_string_lossy().to_string())
}

async fn push_pushgateway_snapshot(succeeded: usize, failed: usize, duration_secs: f64) {
    let base = match std::env::var("FARE_PUSHGATEWAY_URL") {
        Ok(v) if !v.trim().is_empty() => v,
        _ => return,
    };
    let push_url = format!(
        "{}/metrics/job/{}",
        base.trim_end_matches('/'),
        "fare_reporting"
    );

    // Current timestamp for freshness tracking
    let timestamp_secs = Utc::now().timestamp() as f64;

    let body = format!(
        "# TYPE fare_runs_total counter\n\
         fare_runs_total 1\n\
         # TYPE fare_nodes_success_total counter\n\
         fare_nodes_success_total {}\n\
         # TYPE fare_nodes_error_total counter\n\
         fare_nodes_error_total {}\n\
         # TYPE fare_run_duration_seconds gauge\n\
         fare_run_duration_seconds {}\n\
         # TYPE fare_last_run_timestamp_seconds gauge\n\
         fare_last_run_timestamp_seconds {}\n",
        succeeded, failed, duration_secs, timestamp_secs
    );

    let client = reqwest::Client::new();
    let push_res = client
        .post(&push_url)
        .header("Content-Type", "text/plain; version=0.0.4")
        .body(body)
        .send()
        .await;

    match push_res {
        Ok(r) if r.status().is_success() => {
            info!("Pushed run metrics to Pushgateway");
        }
        Ok(r) => {
            warn!(
                "Pushgateway push responded with status {}",
                r.status().as_u16()
            );
        }
        Err(e) => {
            warn!("Failed to push run metrics to Pushgateway: {}", e);
        }
    }
}
