/// Demo: run the complete reporting flow end to end on synthetic data
/// Generates a sample model input table, registers the datasets
/// programmatically, runs the pipeline, and prints the resulting artifacts.
use anyhow::Result;
use fare_reporting::catalog::{
    CsvFormat, DataCatalog, DatasetKind, DatasetSpec, ExportSpec, LocationSpec,
};
use fare_reporting::charts::ChartOptions;
use fare_reporting::common::constants;
use fare_reporting::logging;
use fare_reporting::pipeline::{create_pipeline, run_pipeline};
use fare_reporting::table::generate_sample_table;
use std::env;
use std::path::Path;

fn chart_spec(dataset_id: &str, kind: DatasetKind, path: &str) -> DatasetSpec {
    DatasetSpec {
        spec_version: "1.0.0".to_string(),
        dataset_id: dataset_id.to_string(),
        enabled: true,
        kind,
        location: LocationSpec {
            path: path.to_string(),
        },
        format: None,
        export: Some(ExportSpec::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging();
    dotenv::dotenv().ok();

    // Row count from command-line args, or a default big enough to make the
    // charts interesting
    let args: Vec<String> = env::args().collect();
    let rows: usize = args.get(1).and_then(|a| a.parse().ok()).unwrap_or(500);

    let root = Path::new("demo_output");
    std::fs::create_dir_all(root.join("data"))?;

    println!("🧪 Generating {} sample rows...", rows);
    let table = generate_sample_table(rows, 42);
    table.write_csv_path(&root.join("data/model_input_table.csv"))?;

    let mut catalog = DataCatalog::new(root);
    catalog.insert_spec(DatasetSpec {
        spec_version: "1.0.0".to_string(),
        dataset_id: constants::MODEL_INPUT_TABLE.to_string(),
        enabled: true,
        kind: DatasetKind::CsvTable,
        location: LocationSpec {
            path: "data/model_input_table.csv".to_string(),
        },
        format: Some(CsvFormat::default()),
        export: None,
    });
    catalog.insert_spec(chart_spec(
        constants::CANCELLATION_POLICY_BREAKDOWN,
        DatasetKind::PlotlyJson,
        "output/cancellation_policy_breakdown.json",
    ));
    catalog.insert_spec(chart_spec(
        constants::PRICE_HISTOGRAM,
        DatasetKind::PlotlyJson,
        "output/price_histogram.json",
    ));
    catalog.insert_spec(chart_spec(
        constants::CANCELLATION_POLICY_GRID,
        DatasetKind::PlotlyImage,
        "output/cancellation_policy_grid.png",
    ));

    let pipeline = create_pipeline();
    let summary = run_pipeline(
        &pipeline,
        &catalog,
        &ChartOptions::default(),
        &root.join("output"),
    )
    .await?;

    println!(
        "\n📊 Demo run complete: {}/{} nodes succeeded",
        summary.nodes_succeeded, summary.nodes_total
    );
    for artifact in &summary.artifacts {
        println!("   {}", artifact.path);
    }
    println!("   Manifest: {}", summary.manifest_path);

    Ok(())
}
