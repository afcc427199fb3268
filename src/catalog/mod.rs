// File-backed dataset registry: one JSON spec per dataset, schema-validated
// on load. The catalog resolves dataset names to on-disk locations so the
// pipeline wiring never touches paths.

use crate::error::{ReportingError, Result};
use crate::table::ModelInputTable;
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use plotly::Plot;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
#[cfg(not(feature = "static-export"))]
use tracing::warn;

static DATASET_SCHEMA: Lazy<JSONSchema> = Lazy::new(|| {
    let schema: serde_json::Value =
        serde_json::from_str(include_str!("../../schemas/dataset.v1.json"))
            .expect("embedded dataset schema is valid JSON");
    let schema: &'static serde_json::Value = Box::leak(Box::new(schema));
    JSONSchema::options()
        .compile(schema)
        .expect("embedded dataset schema compiles")
});

/// How a registered dataset is stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    /// Loadable tabular input
    CsvTable,
    /// Chart persisted as plotly figure JSON
    PlotlyJson,
    /// Chart persisted as a standalone HTML page
    PlotlyHtml,
    /// Chart persisted as a static image (requires the static-export feature)
    PlotlyImage,
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatasetKind::CsvTable => "csv_table",
            DatasetKind::PlotlyJson => "plotly_json",
            DatasetKind::PlotlyHtml => "plotly_html",
            DatasetKind::PlotlyImage => "plotly_image",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub spec_version: String,
    pub dataset_id: String,
    pub enabled: bool,
    pub kind: DatasetKind,
    pub location: LocationSpec,
    #[serde(default)]
    pub format: Option<CsvFormat>,
    #[serde(default)]
    pub export: Option<ExportSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSpec {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvFormat {
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default = "default_has_header")]
    pub has_header: bool,
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_has_header() -> bool {
    true
}

impl Default for CsvFormat {
    fn default() -> Self {
        CsvFormat {
            delimiter: default_delimiter(),
            has_header: default_has_header(),
        }
    }
}

impl CsvFormat {
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.bytes().next().unwrap_or(b',')
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSpec {
    #[serde(default = "default_export_width")]
    pub width: usize,
    #[serde(default = "default_export_height")]
    pub height: usize,
    #[serde(default = "default_export_scale")]
    pub scale: f64,
}

fn default_export_width() -> usize {
    1200
}

fn default_export_height() -> usize {
    800
}

fn default_export_scale() -> f64 {
    1.0
}

impl Default for ExportSpec {
    fn default() -> Self {
        ExportSpec {
            width: default_export_width(),
            height: default_export_height(),
            scale: default_export_scale(),
        }
    }
}

/// A persisted chart artifact, as recorded in the run manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub dataset_id: String,
    pub path: String,
    pub bytes: usize,
    pub sha256: String,
}

/// Load and schema-validate a single dataset spec
pub fn load_dataset_spec(path: &Path) -> Result<DatasetSpec> {
    let content = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    if let Err(errors) = DATASET_SCHEMA.validate(&value) {
        let details: Vec<String> = errors.map(|e| e.to_string()).collect();
        crate::observability::metrics::catalog::spec_load_error();
        return Err(ReportingError::InvalidSpec(format!(
            "{}: {}",
            path.display(),
            details.join("; ")
        )));
    }

    let spec: DatasetSpec = serde_json::from_value(value)?;
    crate::observability::metrics::catalog::spec_load_success();
    Ok(spec)
}

/// Named datasets resolved against a base directory
#[derive(Debug, Clone)]
pub struct DataCatalog {
    base_dir: PathBuf,
    specs: HashMap<String, DatasetSpec>,
}

impl DataCatalog {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        DataCatalog {
            base_dir: base_dir.into(),
            specs: HashMap::new(),
        }
    }

    /// Build a catalog from every `*.json` spec in a registry directory
    pub fn from_registry(registry_dir: &Path, base_dir: &Path) -> Result<Self> {
        let mut catalog = Self::new(base_dir);
        let mut paths: Vec<PathBuf> = fs::read_dir(registry_dir)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().map(|ext| ext == "json").unwrap_or(false))
            .collect();
        paths.sort();

        for path in &paths {
            let spec = load_dataset_spec(path)?;
            catalog.insert_spec(spec);
        }
        info!(
            "Loaded {} dataset specs from {}",
            catalog.specs.len(),
            registry_dir.display()
        );
        Ok(catalog)
    }

    pub fn insert_spec(&mut self, spec: DatasetSpec) {
        self.specs.insert(spec.dataset_id.clone(), spec);
    }

    pub fn dataset_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.specs.keys().map(|k| k.as_str()).collect();
        ids.sort();
        ids
    }

    pub fn spec(&self, dataset_id: &str) -> Result<&DatasetSpec> {
        let spec = self
            .specs
            .get(dataset_id)
            .ok_or_else(|| ReportingError::UnknownDataset(dataset_id.to_string()))?;
        if !spec.enabled {
            return Err(ReportingError::DatasetDisabled(dataset_id.to_string()));
        }
        Ok(spec)
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        let path = PathBuf::from(relative);
        if path.is_absolute() {
            path
        } else {
            self.base_dir.join(path)
        }
    }

    /// Load a registered csv_table dataset into memory
    pub fn load_table(&self, dataset_id: &str) -> Result<ModelInputTable> {
        let spec = self.spec(dataset_id)?;
        if spec.kind != DatasetKind::CsvTable {
            return Err(ReportingError::NotATable(dataset_id.to_string()));
        }

        let format = spec.format.clone().unwrap_or_default();
        let path = self.resolve(&spec.location.path);
        let t0 = std::time::Instant::now();
        let table =
            ModelInputTable::from_csv_path(&path, format.delimiter_byte(), format.has_header)?;
        crate::observability::metrics::catalog::table_rows(table.len());
        crate::observability::metrics::catalog::table_load_duration(t0.elapsed().as_secs_f64());
        info!("Loaded {} rows from {}", table.len(), path.display());
        Ok(table)
    }

    /// Persist a chart under a registered artifact dataset, returning the
    /// written path with its checksum
    pub fn save_chart(&self, dataset_id: &str, plot: &Plot) -> Result<ArtifactRecord> {
        let spec = self.spec(dataset_id)?;
        let path = self.resolve(&spec.location.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let (written_path, bytes) = match spec.kind {
            DatasetKind::CsvTable => {
                return Err(ReportingError::NotAChartSink(dataset_id.to_string()))
            }
            DatasetKind::PlotlyJson => {
                let body = plot.to_json();
                fs::write(&path, &body)?;
                (path, body.into_bytes())
            }
            DatasetKind::PlotlyHtml => {
                let body = plot.to_html();
                fs::write(&path, &body)?;
                (path, body.into_bytes())
            }
            DatasetKind::PlotlyImage => self.write_image(spec, &path, plot)?,
        };

        let sha256 = sha256_hex(&bytes);
        crate::observability::metrics::catalog::artifact_written(bytes.len());
        info!(
            "Saved {} ({}) to {}",
            dataset_id,
            spec.kind,
            written_path.display()
        );
        Ok(ArtifactRecord {
            dataset_id: dataset_id.to_string(),
            path: written_path.to_string_lossy().to_string(),
            bytes: bytes.len(),
            sha256,
        })
    }

    #[cfg(feature = "static-export")]
    fn write_image(&self, spec: &DatasetSpec, path: &Path, plot: &Plot) -> Result<(PathBuf, Vec<u8>)> {
        let export = spec.export.clone().unwrap_or_default();
        plot.write_image(
            path,
            plotly::ImageFormat::PNG,
            export.width,
            export.height,
            export.scale,
        );
        let bytes = fs::read(path)?;
        Ok((path.to_path_buf(), bytes))
    }

    #[cfg(not(feature = "static-export"))]
    fn write_image(&self, spec: &DatasetSpec, path: &Path, plot: &Plot) -> Result<(PathBuf, Vec<u8>)> {
        // No PNG renderer in this build; degrade to HTML next to the declared path
        let html_path = path.with_extension("html");
        warn!(
            "static-export feature is disabled; writing {} as HTML to {}",
            spec.dataset_id,
            html_path.display()
        );
        let body = plot.to_html();
        fs::write(&html_path, &body)?;
        Ok((html_path, body.into_bytes()))
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
