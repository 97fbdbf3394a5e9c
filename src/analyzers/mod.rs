//! City-level aggregation of validated price observations.
//!
//! Groups observations by registry city, computes per-size price statistics,
//! derives the affordability index from provincial minimum wages, and
//! optionally publishes the resulting dataset to S3.

pub mod aggregate;
pub mod types;
pub mod utility;
pub mod writetos3;

pub use aggregate::{aggregate_cities, affordability_index};
pub use types::{AggregationOutcome, City, CityAggregate, CityDataset, DatasetSummary, WageTable};
