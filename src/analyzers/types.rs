//! Data types used by the aggregation pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One registry city. The registry, not the observations, decides which cities
/// appear in the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub province: String,
    pub lat: f64,
    pub lon: f64,
}

/// Hourly minimum wage keyed by province code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WageTable {
    wages: HashMap<String, f64>,
}

impl WageTable {
    pub fn new(wages: HashMap<String, f64>) -> Self {
        Self { wages }
    }

    pub fn hourly_wage(&self, province: &str) -> Option<f64> {
        self.wages.get(province).copied()
    }

    pub fn len(&self) -> usize {
        self.wages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wages.is_empty()
    }
}

impl FromIterator<(String, f64)> for WageTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Summary statistics for one portion size, rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// Per-size statistics; a size with no observations is omitted entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small: Option<SizeStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular: Option<SizeStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<SizeStats>,
}

/// One city's output record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityAggregate {
    pub name: String,
    pub province: String,
    pub lat: f64,
    pub lon: f64,
    pub prices: PriceStats,
    pub sample_size: usize,
    /// 0 when the province has no wage entry.
    pub minimum_wage: f64,
    /// Minutes of minimum-wage work for one regular portion; 0 means "no data".
    pub affordability_index: f64,
}

/// A registry city whose province had no wage entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingWage {
    pub city: String,
    pub province: String,
}

/// Everything one aggregation pass produces.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationOutcome {
    /// One record per registry city, in registry order.
    pub cities: Vec<CityAggregate>,
    pub missing_wages: Vec<MissingWage>,
    /// Observation cities absent from the registry, sorted.
    pub unmatched_cities: Vec<String>,
}

/// Headline numbers over an aggregated dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub cities_with_data: usize,
    pub total_cities: usize,
    pub total_samples: usize,
    pub regular_mean_range: Option<(f64, f64)>,
    pub affordability_range: Option<(f64, f64)>,
}

/// Final dataset envelope, written as `cities_final.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityDataset {
    pub last_updated: String,
    pub data_version: String,
    pub cities: Vec<CityAggregate>,
}
