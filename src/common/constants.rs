/// Dataset name constants to ensure consistency across the codebase
/// These constants are the contract between the pipeline wiring and the
/// dataset registry
// The single tabular input every reporting node consumes
pub const MODEL_INPUT_TABLE: &str = "model_input_table";

// Chart artifacts produced by the reporting pipeline
pub const CANCELLATION_POLICY_BREAKDOWN: &str = "cancellation_policy_breakdown";
pub const PRICE_HISTOGRAM: &str = "price_histogram";
pub const CANCELLATION_POLICY_GRID: &str = "cancellation_policy_grid";

// Node function names (stable identifiers used by the CLI and the run manifest)
pub const MAKE_CANCEL_POLICY_BAR_CHART: &str = "make_cancel_policy_bar_chart";
pub const MAKE_PRICE_HISTOGRAM: &str = "make_price_histogram";
pub const MAKE_PRICE_ANALYSIS_IMAGE: &str = "make_price_analysis_image";

/// Get all node function names declared by the reporting pipeline
pub fn supported_node_functions() -> Vec<&'static str> {
    vec![
        MAKE_CANCEL_POLICY_BAR_CHART,
        MAKE_PRICE_HISTOGRAM,
        MAKE_PRICE_ANALYSIS_IMAGE,
    ]
}

/// Get all chart artifact names produced by the reporting pipeline
pub fn chart_outputs() -> Vec<&'static str> {
    vec![
        CANCELLATION_POLICY_BREAKDOWN,
        PRICE_HISTOGRAM,
        CANCELLATION_POLICY_GRID,
    ]
}
