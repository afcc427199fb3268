use crate::error::{ReportingError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Bucket used when a row carries no engine type
pub const ENGINE_UNKNOWN: &str = "unknown";

/// One row of the model input table: a priced listing and its cancellation terms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRecord {
    #[serde(default)]
    pub listing_id: Option<u64>,
    pub price: f64,
    pub cancellation_policy: String,
    #[serde(default)]
    pub engine_type: Option<String>,
    #[serde(default)]
    pub passenger_capacity: Option<u32>,
    #[serde(default)]
    pub review_scores_rating: Option<f64>,
}

/// The tabular input shared by every reporting node
#[derive(Debug, Clone, Default)]
pub struct ModelInputTable {
    records: Vec<ListingRecord>,
}

impl ModelInputTable {
    pub fn new(records: Vec<ListingRecord>) -> Self {
        ModelInputTable { records }
    }

    pub fn from_csv_path(path: &Path, delimiter: u8, has_header: bool) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(has_header)
            .from_path(path)?;
        Self::collect_records(reader)
    }

    pub fn from_csv_reader<R: Read>(reader: R, delimiter: u8, has_header: bool) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(has_header)
            .from_reader(reader);
        Self::collect_records(reader)
    }

    fn collect_records<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: ListingRecord = row?;
            records.push(record);
        }
        debug!("Loaded {} listing records", records.len());
        Ok(ModelInputTable { records })
    }

    pub fn write_csv_path(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn records(&self) -> &[ListingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.price).collect()
    }

    /// Distinct cancellation policies, sorted for stable chart ordering
    pub fn policies(&self) -> Vec<String> {
        let mut set: Vec<String> = self
            .records
            .iter()
            .map(|r| r.cancellation_policy.clone())
            .collect();
        set.sort();
        set.dedup();
        set
    }

    pub fn policy_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.cancellation_policy.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Mean price keyed by engine type, then by cancellation policy.
    /// Rows without an engine type land in the "unknown" bucket.
    pub fn mean_price_by_policy_and_engine(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        let mut sums: BTreeMap<String, BTreeMap<String, (f64, usize)>> = BTreeMap::new();
        for record in &self.records {
            let engine = record
                .engine_type
                .clone()
                .unwrap_or_else(|| ENGINE_UNKNOWN.to_string());
            let entry = sums
                .entry(engine)
                .or_default()
                .entry(record.cancellation_policy.clone())
                .or_insert((0.0, 0));
            entry.0 += record.price;
            entry.1 += 1;
        }

        sums.into_iter()
            .map(|(engine, by_policy)| {
                let means = by_policy
                    .into_iter()
                    .map(|(policy, (total, count))| (policy, total / count as f64))
                    .collect();
                (engine, means)
            })
            .collect()
    }

    /// Fixed-width price bins spanning the full price range of the table.
    /// Shared edges keep per-policy histograms comparable across subplots.
    pub fn price_bins(&self, bins: usize) -> Result<PriceBins> {
        PriceBins::from_values(&self.prices(), bins)
    }

    pub fn bin_counts_for_policy(&self, policy: &str, bins: &PriceBins) -> Vec<u64> {
        let prices: Vec<f64> = self
            .records
            .iter()
            .filter(|r| r.cancellation_policy == policy)
            .map(|r| r.price)
            .collect();
        bins.count(&prices)
    }
}

/// Fixed-width histogram bin edges over a price range
#[derive(Debug, Clone)]
pub struct PriceBins {
    edges: Vec<f64>,
}

impl PriceBins {
    pub fn from_values(values: &[f64], bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(ReportingError::Chart(
                "histogram bin count must be nonzero".to_string(),
            ));
        }
        if values.is_empty() {
            return Err(ReportingError::Chart(
                "cannot bin an empty value set".to_string(),
            ));
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max <= min {
            // Degenerate range: all values equal, widen so every bin has nonzero width
            max = min + 1.0;
        }

        let step = (max - min) / bins as f64;
        let edges = (0..=bins).map(|i| min + step * i as f64).collect();
        Ok(PriceBins { edges })
    }

    pub fn len(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Midpoint of each bin, used as bar positions in grid charts
    pub fn centers(&self) -> Vec<f64> {
        self.edges
            .windows(2)
            .map(|pair| (pair[0] + pair[1]) / 2.0)
            .collect()
    }

    /// Count values per bin. Values outside the range clamp into the edge bins.
    pub fn count(&self, values: &[f64]) -> Vec<u64> {
        let bins = self.len();
        let min = self.edges[0];
        let max = self.edges[bins];
        let step = (max - min) / bins as f64;

        let mut counts = vec![0u64; bins];
        for &value in values {
            let mut index = ((value - min) / step).floor() as isize;
            if index < 0 {
                index = 0;
            }
            if index as usize >= bins {
                index = bins as isize - 1;
            }
            counts[index as usize] += 1;
        }
        counts
    }
}

/// Deterministic synthetic model input table for demos and tests
pub fn generate_sample_table(rows: usize, seed: u64) -> ModelInputTable {
    let policies = ["flexible", "moderate", "strict"];
    let base_prices = [95.0, 150.0, 235.0];
    let engines = ["Quantum", "Plasma", "Nuclear"];
    let engine_factors = [1.1, 0.95, 1.2];
    let capacities = [2u32, 4, 6, 8, 10, 12];

    let mut rng = StdRng::seed_from_u64(seed);
    let mut records = Vec::with_capacity(rows);
    for i in 0..rows {
        let policy_idx = rng.gen_range(0..policies.len());
        let engine_idx = rng.gen_range(0..engines.len());
        let price =
            (base_prices[policy_idx] * engine_factors[engine_idx]
                + rng.gen_range(-25.0_f64..25.0))
            .max(40.0_f64);
        records.push(ListingRecord {
            listing_id: Some(1000 + i as u64),
            price: (price * 100.0).round() / 100.0,
            cancellation_policy: policies[policy_idx].to_string(),
            engine_type: Some(engines[engine_idx].to_string()),
            passenger_capacity: Some(capacities[rng.gen_range(0..capacities.len())]),
            review_scores_rating: Some((rng.gen_range(78.0..99.5_f64) * 10.0).round() / 10.0),
        });
    }
    ModelInputTable::new(records)
}
