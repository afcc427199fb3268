use anyhow::Result;
use fare_reporting::catalog::{sha256_hex, DataCatalog};
use fare_reporting::charts::ChartOptions;
use fare_reporting::common::constants;
use fare_reporting::pipeline::{create_pipeline, run_pipeline};
use fare_reporting::table::generate_sample_table;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const CSV_HEADER: &str =
    "listing_id,price,cancellation_policy,engine_type,passenger_capacity,review_scores_rating\n";

fn write_registry(registry: &Path) -> Result<()> {
    fs::create_dir_all(registry)?;
    let specs = [
        (
            constants::MODEL_INPUT_TABLE,
            "csv_table",
            "data/model_input_table.csv",
        ),
        (
            constants::CANCELLATION_POLICY_BREAKDOWN,
            "plotly_json",
            "output/cancellation_policy_breakdown.json",
        ),
        (
            constants::PRICE_HISTOGRAM,
            "plotly_json",
            "output/price_histogram.json",
        ),
        (
            constants::CANCELLATION_POLICY_GRID,
            "plotly_image",
            "output/cancellation_policy_grid.png",
        ),
    ];

    for (id, kind, path) in specs {
        let spec = serde_json::json!({
            "spec_version": "1.0.0",
            "dataset_id": id,
            "enabled": true,
            "kind": kind,
            "location": { "path": path }
        });
        fs::write(
            registry.join(format!("{}.json", id)),
            serde_json::to_string_pretty(&spec)?,
        )?;
    }
    Ok(())
}

#[tokio::test]
async fn full_run_writes_all_artifacts_and_a_manifest() -> Result<()> {
    let temp = tempdir()?;
    let root = temp.path();
    let registry = root.join("registry");
    write_registry(&registry)?;

    fs::create_dir_all(root.join("data"))?;
    generate_sample_table(120, 9).write_csv_path(&root.join("data/model_input_table.csv"))?;

    let catalog = DataCatalog::from_registry(&registry, root)?;
    let pipeline = create_pipeline();
    let summary = run_pipeline(
        &pipeline,
        &catalog,
        &ChartOptions::default(),
        &root.join("output"),
    )
    .await?;

    assert_eq!(summary.nodes_total, 3);
    assert_eq!(summary.nodes_succeeded, 3);
    assert!(summary.errors.is_empty());
    assert_eq!(summary.artifacts.len(), 3);

    // Recorded checksums match what actually landed on disk
    for artifact in &summary.artifacts {
        let written = fs::read(&artifact.path)?;
        assert_eq!(artifact.bytes, written.len());
        assert_eq!(artifact.sha256, sha256_hex(&written));
    }

    assert!(root.join("output/cancellation_policy_breakdown.json").exists());
    assert!(root.join("output/price_histogram.json").exists());

    // Without static-export the grid dataset degrades to HTML
    let grid = summary
        .artifacts
        .iter()
        .find(|a| a.dataset_id == constants::CANCELLATION_POLICY_GRID)
        .expect("grid artifact recorded");
    if cfg!(feature = "static-export") {
        assert!(grid.path.ends_with(".png"));
    } else {
        assert!(grid.path.ends_with(".html"));
    }

    let manifest_raw = fs::read_to_string(&summary.manifest_path)?;
    let manifest: serde_json::Value = serde_json::from_str(&manifest_raw)?;
    assert_eq!(manifest["nodes"].as_array().unwrap().len(), 3);
    assert!(manifest["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .all(|n| n["status"] == "ok"));

    Ok(())
}

#[tokio::test]
async fn missing_input_table_fails_the_run_before_any_node() -> Result<()> {
    let temp = tempdir()?;
    let root = temp.path();
    let registry = root.join("registry");
    write_registry(&registry)?;
    // No CSV written to data/

    let catalog = DataCatalog::from_registry(&registry, root)?;
    let pipeline = create_pipeline();
    let result = run_pipeline(
        &pipeline,
        &catalog,
        &ChartOptions::default(),
        &root.join("output"),
    )
    .await;

    assert!(result.is_err());
    assert!(!root.join("output/price_histogram.json").exists());
    Ok(())
}

#[tokio::test]
async fn empty_input_table_collects_a_failure_per_node() -> Result<()> {
    let temp = tempdir()?;
    let root = temp.path();
    let registry = root.join("registry");
    write_registry(&registry)?;

    fs::create_dir_all(root.join("data"))?;
    fs::write(root.join("data/model_input_table.csv"), CSV_HEADER)?;

    let catalog = DataCatalog::from_registry(&registry, root)?;
    let pipeline = create_pipeline();
    let summary = run_pipeline(
        &pipeline,
        &catalog,
        &ChartOptions::default(),
        &root.join("output"),
    )
    .await?;

    // Node failures never abort the remaining nodes
    assert_eq!(summary.nodes_total, 3);
    assert_eq!(summary.nodes_succeeded, 0);
    assert_eq!(summary.errors.len(), 3);
    assert!(summary.artifacts.is_empty());

    // The manifest still records the failed run
    let manifest_raw = fs::read_to_string(&summary.manifest_path)?;
    let manifest: serde_json::Value = serde_json::from_str(&manifest_raw)?;
    assert!(manifest["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .all(|n| n["status"] == "failed"));

    Ok(())
}

#[tokio::test]
async fn disabled_artifact_dataset_fails_only_its_node() -> Result<()> {
    let temp = tempdir()?;
    let root = temp.path();
    let registry = root.join("registry");
    write_registry(&registry)?;

    // Switch off the histogram artifact
    let spec_path = registry.join(format!("{}.json", constants::PRICE_HISTOGRAM));
    let mut spec: serde_json::Value = serde_json::from_str(&fs::read_to_string(&spec_path)?)?;
    spec["enabled"] = serde_json::json!(false);
    fs::write(&spec_path, serde_json::to_string_pretty(&spec)?)?;

    fs::create_dir_all(root.join("data"))?;
    generate_sample_table(60, 21).write_csv_path(&root.join("data/model_input_table.csv"))?;

    let catalog = DataCatalog::from_registry(&registry, root)?;
    let pipeline = create_pipeline();
    let summary = run_pipeline(
        &pipeline,
        &catalog,
        &ChartOptions::default(),
        &root.join("output"),
    )
    .await?;

    assert_eq!(summary.nodes_succeeded, 2);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].contains(constants::MAKE_PRICE_HISTOGRAM));
    assert!(!root.join("output/price_histogram.json").exists());
    assert!(root.join("output/cancellation_policy_breakdown.json").exists());

    Ok(())
}
