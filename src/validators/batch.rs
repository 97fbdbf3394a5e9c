//! Checks that need the whole batch: per-city outliers and duplicate identities.

use crate::analyzers::utility::{mean, sample_stddev};
use crate::config::ValidationConfig;
use crate::observation::{RawObservation, Size};
use crate::validators::findings::{Check, Finding};
use std::collections::{BTreeMap, HashSet};

/// Flags regular prices whose |z| within their city exceeds the configured threshold.
///
/// Cities with fewer than `outlier_min_samples` regular prices, or with zero
/// spread, are skipped. Observations without a city never take part.
pub fn find_outliers(observations: &[RawObservation], config: &ValidationConfig) -> Vec<Finding> {
    let mut by_city: BTreeMap<&str, Vec<(&RawObservation, f64)>> = BTreeMap::new();

    for obs in observations {
        let (Some(city), Some(regular)) = (obs.city.as_deref(), obs.price(Size::Regular)) else {
            continue;
        };
        by_city.entry(city).or_default().push((obs, regular));
    }

    let mut findings = Vec::new();

    for (city, entries) in by_city {
        if entries.len() < config.outlier_min_samples {
            continue;
        }

        let values: Vec<f64> = entries.iter().map(|(_, price)| *price).collect();
        let city_mean = mean(&values);
        let Some(sd) = sample_stddev(&values, city_mean) else {
            continue;
        };
        if sd == 0.0 {
            continue;
        }

        for (obs, price) in entries {
            let z_score = (price - city_mean).abs() / sd;
            if z_score > config.outlier_z_threshold {
                tracing::debug!(city, price, z_score, "Regular price outlier");
                findings.push(Finding::new(
                    &obs.key(),
                    Check::Outlier {
                        price,
                        z_score,
                        city_mean,
                    },
                ));
            }
        }
    }

    findings
}

/// Flags the second and later observations sharing a `(city, restaurant_name)` key.
pub fn find_duplicates(observations: &[RawObservation]) -> Vec<Finding> {
    let mut seen = HashSet::new();
    let mut findings = Vec::new();

    for obs in observations {
        let key = obs.key();
        if seen.contains(&key) {
            findings.push(Finding::new(&key, Check::Duplicate));
        } else {
            seen.insert(key);
        }
    }

    findings
}
