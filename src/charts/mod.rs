// Reporting nodes: each consumes the model input table and returns one figure.
// Persistence is the catalog's job, so every function here stays pure.

use crate::common::constants;
use crate::error::{ReportingError, Result};
use crate::table::ModelInputTable;
use once_cell::sync::Lazy;
use plotly::common::color::Rgb;
use plotly::common::{Marker, Title};
use plotly::layout::{Axis, BarMode, GridPattern, Layout, LayoutGrid};
use plotly::{Bar, Histogram, Plot};
use serde::Deserialize;

/// Rendering knobs shared by all reporting nodes, loaded from `[charts]` in config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct ChartOptions {
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
    #[serde(default = "default_price_axis_label")]
    pub price_axis_label: String,
    #[serde(default = "default_grid_columns")]
    pub grid_columns: usize,
}

fn default_histogram_bins() -> usize {
    20
}

fn default_price_axis_label() -> String {
    "Price (USD)".to_string()
}

fn default_grid_columns() -> usize {
    2
}

impl Default for ChartOptions {
    fn default() -> Self {
        ChartOptions {
            histogram_bins: default_histogram_bins(),
            price_axis_label: default_price_axis_label(),
            grid_columns: default_grid_columns(),
        }
    }
}

// Trace colors, assigned per series in declaration order
static TRACE_PALETTE: Lazy<Vec<Rgb>> = Lazy::new(|| {
    vec![
        Rgb::new(31, 119, 180),
        Rgb::new(255, 127, 14),
        Rgb::new(44, 160, 44),
        Rgb::new(214, 39, 40),
        Rgb::new(148, 103, 189),
        Rgb::new(140, 86, 75),
    ]
});

fn palette(index: usize) -> Rgb {
    TRACE_PALETTE[index % TRACE_PALETTE.len()]
}

fn ensure_not_empty(table: &ModelInputTable, func_name: &str) -> Result<()> {
    if table.is_empty() {
        return Err(ReportingError::EmptyTable(func_name.to_string()));
    }
    Ok(())
}

/// Grouped bar chart of mean price per cancellation policy, one trace per engine type
pub fn make_cancel_policy_bar_chart(table: &ModelInputTable, options: &ChartOptions) -> Result<Plot> {
    ensure_not_empty(table, constants::MAKE_CANCEL_POLICY_BAR_CHART)?;

    let mut plot = Plot::new();
    for (i, (engine, means)) in table.mean_price_by_policy_and_engine().iter().enumerate() {
        let x: Vec<String> = means.keys().cloned().collect();
        let y: Vec<f64> = means.values().copied().collect();
        let trace = Bar::new(x, y)
            .name(engine)
            .marker(Marker::new().color(palette(i)));
        plot.add_trace(trace);
    }

    let layout = Layout::new()
        .title(Title::new("Average price by cancellation policy"))
        .bar_mode(BarMode::Group)
        .x_axis(Axis::new().title(Title::new("Cancellation policy")))
        .y_axis(Axis::new().title(Title::new(&options.price_axis_label)));
    plot.set_layout(layout);
    Ok(plot)
}

/// Histogram of listing prices across the whole table
pub fn make_price_histogram(table: &ModelInputTable, options: &ChartOptions) -> Result<Plot> {
    ensure_not_empty(table, constants::MAKE_PRICE_HISTOGRAM)?;
    if options.histogram_bins == 0 {
        return Err(ReportingError::Chart(
            "histogram bin count must be nonzero".to_string(),
        ));
    }

    let trace = Histogram::new(table.prices())
        .name("price")
        .n_bins_x(options.histogram_bins)
        .marker(Marker::new().color(palette(0)));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(
        Layout::new()
            .title(Title::new("Price distribution"))
            .x_axis(Axis::new().title(Title::new(&options.price_axis_label)))
            .y_axis(Axis::new().title(Title::new("Listings"))),
    );
    Ok(plot)
}

/// Small-multiples grid of per-policy price histograms, one subplot per policy.
/// Bins are computed once over the whole table so the subplots stay comparable.
pub fn make_price_analysis_image(table: &ModelInputTable, options: &ChartOptions) -> Result<Plot> {
    ensure_not_empty(table, constants::MAKE_PRICE_ANALYSIS_IMAGE)?;

    let policies = table.policies();
    let bins = table.price_bins(options.histogram_bins)?;
    let centers = bins.centers();

    let columns = options.grid_columns.max(1);
    let rows = (policies.len() + columns - 1) / columns;

    let mut plot = Plot::new();
    for (i, policy) in policies.iter().enumerate() {
        let counts = table.bin_counts_for_policy(policy, &bins);
        let trace = Bar::new(centers.clone(), counts)
            .name(policy)
            .marker(Marker::new().color(palette(i)))
            .x_axis(&format!("x{}", i + 1))
            .y_axis(&format!("y{}", i + 1));
        plot.add_trace(trace);
    }

    plot.set_layout(
        Layout::new()
            .title(Title::new("Price distribution by cancellation policy"))
            .grid(
                LayoutGrid::new()
                    .rows(rows)
                    .columns(columns)
                    .pattern(GridPattern::Independent),
            ),
    );
    Ok(plot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::generate_sample_table;
    use serde_json::Value;

    fn plot_json(plot: &Plot) -> Value {
        serde_json::from_str(&plot.to_json()).unwrap()
    }

    #[test]
    fn bar_chart_has_one_trace_per_engine_type() {
        let table = generate_sample_table(200, 3);
        let plot = make_cancel_policy_bar_chart(&table, &ChartOptions::default()).unwrap();
        let json = plot_json(&plot);
        let traces = json["data"].as_array().unwrap();
        // Sample generator always emits all three engine types at 200 rows
        assert_eq!(traces.len(), 3);
        assert_eq!(traces[0]["type"], "bar");
    }

    #[test]
    fn histogram_has_single_price_trace() {
        let table = generate_sample_table(50, 3);
        let plot = make_price_histogram(&table, &ChartOptions::default()).unwrap();
        let json = plot_json(&plot);
        let traces = json["data"].as_array().unwrap();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0]["type"], "histogram");
        assert_eq!(traces[0]["name"], "price");
    }

    #[test]
    fn grid_assigns_each_policy_its_own_subplot_axes() {
        let table = generate_sample_table(200, 3);
        let plot = make_price_analysis_image(&table, &ChartOptions::default()).unwrap();
        let json = plot_json(&plot);
        let traces = json["data"].as_array().unwrap();
        assert_eq!(traces.len(), 3);
        assert_eq!(traces[1]["xaxis"], "x2");
        assert_eq!(traces[2]["yaxis"], "y3");
    }

    #[test]
    fn empty_table_is_rejected_by_every_node() {
        let table = ModelInputTable::default();
        let options = ChartOptions::default();
        assert!(make_cancel_policy_bar_chart(&table, &options).is_err());
        assert!(make_price_histogram(&table, &options).is_err());
        assert!(make_price_analysis_image(&table, &options).is_err());
    }

    #[test]
    fn zero_histogram_bins_is_rejected() {
        let table = generate_sample_table(10, 1);
        let options = ChartOptions {
            histogram_bins: 0,
            ..ChartOptions::default()
        };
        assert!(make_price_histogram(&table, &options).is_err());
    }
}
