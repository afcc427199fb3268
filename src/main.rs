use clap::{Parser, Subcommand};
use fare_reporting::catalog::DataCatalog;
use fare_reporting::common::constants;
use fare_reporting::config::Config;
use fare_reporting::error::Result;
use fare_reporting::pipeline::{create_pipeline, run_pipeline};
use fare_reporting::report::{PriceReport, ReportSection};
use fare_reporting::table::generate_sample_table;
use fare_reporting::{logging, observability};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "fare_reporting")]
#[command(about = "Price analysis reporting pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full reporting pipeline
    Run {
        /// Registry directory holding dataset specs
        #[arg(long)]
        registry: Option<String>,
        /// Base directory that relative dataset paths resolve against
        #[arg(long)]
        base_dir: Option<String>,
        /// Directory receiving the run manifest
        #[arg(long)]
        output_dir: Option<String>,
    },
    /// Print the declared pipeline nodes
    Nodes,
    /// Run a single node and persist its artifact
    Render {
        /// Node function name to run
        #[arg(long)]
        node: String,
        #[arg(long)]
        registry: Option<String>,
        #[arg(long)]
        base_dir: Option<String>,
    },
    /// Generate a synthetic model input table CSV
    Sample {
        #[arg(long, default_value_t = 250)]
        rows: usize,
        #[arg(long, default_value_t = 7)]
        seed: u64,
        /// Output CSV path
        #[arg(long, default_value = "data/model_input_table.csv")]
        out: String,
    },
    /// Build a single-page HTML report from all reporting charts
    Report {
        #[arg(long)]
        registry: Option<String>,
        #[arg(long)]
        base_dir: Option<String>,
        /// Output HTML path (defaults to report.html in the output directory)
        #[arg(long)]
        out: Option<String>,
    },
}

fn build_catalog(
    config: &Config,
    registry: Option<String>,
    base_dir: Option<String>,
) -> Result<DataCatalog> {
    let registry = registry.unwrap_or_else(|| config.reporting.registry_dir.clone());
    let base_dir = base_dir.unwrap_or_else(|| config.reporting.base_dir.clone());
    DataCatalog::from_registry(Path::new(&registry), Path::new(&base_dir))
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    logging::init_logging();
    dotenv::dotenv().ok();

    if let Err(e) = observability::metrics::init() {
        warn!("Metrics init failed: {}", e);
    }
    observability::metrics::heartbeat();

    let cli = Cli::parse();
    let config = Config::load_or_default();

    match cli.command {
        Commands::Run {
            registry,
            base_dir,
            output_dir,
        } => {
            println!("🔄 Running reporting pipeline...");

            let catalog = build_catalog(&config, registry, base_dir)?;
            let output_dir = output_dir.unwrap_or_else(|| config.reporting.output_dir.clone());
            let pipeline = create_pipeline();

            match run_pipeline(&pipeline, &catalog, &config.charts, Path::new(&output_dir)).await {
                Ok(summary) => {
                    info!("Pipeline finished");
                    println!("\n📊 Reporting run {}:", summary.run_id);
                    println!(
                        "   Nodes: {}/{} succeeded",
                        summary.nodes_succeeded, summary.nodes_total
                    );
                    for artifact in &summary.artifacts {
                        println!("   Artifact: {} ({} bytes)", artifact.path, artifact.bytes);
                    }
                    println!("   Manifest: {}", summary.manifest_path);

                    if !summary.errors.is_empty() {
                        warn!(
                            "{} errors encountered during pipeline run",
                            summary.errors.len()
                        );
                        println!("\n⚠️  Errors encountered:");
                        for error in &summary.errors {
                            println!("   - {}", error);
                        }
                    }
                }
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    println!("❌ Pipeline failed: {}", e);
                }
            }
        }
        Commands::Nodes => {
            println!("📋 Declared reporting nodes:");
            for node in create_pipeline().nodes() {
                println!(
                    "   {} : {} -> {}",
                    node.func_name(),
                    node.input(),
                    node.output()
                );
            }
        }
        Commands::Render {
            node,
            registry,
            base_dir,
        } => {
            let pipeline = create_pipeline();
            match pipeline.node_by_func_name(&node) {
                Some(selected) => {
                    let catalog = build_catalog(&config, registry, base_dir)?;
                    let table = catalog.load_table(selected.input())?;
                    let plot = selected.run(&table, &config.charts)?;
                    let artifact = catalog.save_chart(selected.output(), &plot)?;
                    println!(
                        "✅ {} -> {} ({} bytes)",
                        selected.func_name(),
                        artifact.path,
                        artifact.bytes
                    );
                }
                None => {
                    warn!("Unknown node specified");
                    println!(
                        "⚠️  Unknown node: {}. Available: {}",
                        node,
                        constants::supported_node_functions().join(", ")
                    );
                }
            }
        }
        Commands::Sample { rows, seed, out } => {
            println!("🧪 Generating {} sample rows (seed {})...", rows, seed);
            let table = generate_sample_table(rows, seed);
            let path = PathBuf::from(&out);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            table.write_csv_path(&path)?;
            println!("💾 Wrote {} rows to {}", table.len(), out);
        }
        Commands::Report {
            registry,
            base_dir,
            out,
        } => {
            println!("📝 Building HTML report...");

            let catalog = build_catalog(&config, registry, base_dir)?;
            let pipeline = create_pipeline();
            let table = catalog.load_table(constants::MODEL_INPUT_TABLE)?;

            let mut report = PriceReport::new("Price analysis");
            for node in pipeline.nodes() {
                let plot = node.run(&table, &config.charts)?;
                let mut section = ReportSection::new(node.output());
                section.add_plot(&plot);
                report.add_section(section);
            }

            let out =
                out.unwrap_or_else(|| format!("{}/report.html", config.reporting.output_dir));
            let path = PathBuf::from(&out);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            report.save_to_file(&path)?;
            println!("💾 Wrote report to {}", out);
        }
    }

    Ok(())
}
