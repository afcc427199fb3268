use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV deserialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    #[error("Dataset is disabled: {0}")]
    DatasetDisabled(String),

    #[error("Dataset spec failed validation: {0}")]
    InvalidSpec(String),

    #[error("Dataset '{0}' is not a loadable table")]
    NotATable(String),

    #[error("Dataset '{0}' cannot store a chart")]
    NotAChartSink(String),

    #[error("Input table is empty for {0}")]
    EmptyTable(String),

    #[error("Chart construction failed: {0}")]
    Chart(String),
}

pub type Result<T> = std::result::Result<T, ReportingError>;
