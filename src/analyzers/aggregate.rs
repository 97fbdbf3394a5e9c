use crate::analyzers::types::{
    AggregationOutcome, City, CityAggregate, CityDataset, DatasetSummary, MissingWage,
    PriceStats, SizeStats, WageTable,
};
use crate::analyzers::utility::{mean, median, round2};
use crate::observation::{RawObservation, Size};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Version stamped on every published dataset.
pub const DATA_VERSION: &str = "1.0.0";

impl SizeStats {
    /// Statistics over full-precision prices, rounded only at the end.
    /// Returns `None` for an empty slice.
    pub fn from_prices(prices: &[f64]) -> Option<Self> {
        if prices.is_empty() {
            return None;
        }

        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(SizeStats {
            mean: round2(mean(prices).clamp(min, max)),
            median: round2(median(prices)),
            min: round2(min),
            max: round2(max),
        })
    }
}

impl PriceStats {
    fn from_observations(observations: &[&RawObservation]) -> Self {
        let stats_for = |size: Size| {
            let prices: Vec<f64> = observations.iter().filter_map(|o| o.price(size)).collect();
            SizeStats::from_prices(&prices)
        };

        PriceStats {
            small: stats_for(Size::Small),
            regular: stats_for(Size::Regular),
            large: stats_for(Size::Large),
        }
    }
}

/// Minutes of minimum-wage work needed for one regular portion.
///
/// Returns 0 (meaning "undefined") when there is no regular mean or the wage
/// is not strictly positive.
pub fn affordability_index(regular_mean: Option<f64>, minimum_wage: f64) -> f64 {
    match regular_mean {
        Some(price) if minimum_wage > 0.0 => round2(price / minimum_wage * 60.0),
        _ => 0.0,
    }
}

/// Aggregates one registry city from the observations attributed to it.
pub fn aggregate_city(
    city: &City,
    observations: &[&RawObservation],
    minimum_wage: f64,
) -> CityAggregate {
    let prices = PriceStats::from_observations(observations);
    let affordability = affordability_index(prices.regular.map(|s| s.mean), minimum_wage);

    CityAggregate {
        name: city.name.clone(),
        province: city.province.clone(),
        lat: city.lat,
        lon: city.lon,
        prices,
        sample_size: observations.len(),
        minimum_wage,
        affordability_index: affordability,
    }
}

/// Aggregates validated observations into one record per registry city.
///
/// Output follows registry order. Observations whose city is not in the
/// registry are reported in `unmatched_cities` and otherwise ignored.
pub fn aggregate_cities(
    registry: &[City],
    wages: &WageTable,
    observations: &[RawObservation],
) -> AggregationOutcome {
    let mut by_city: HashMap<&str, Vec<&RawObservation>> = HashMap::new();
    for obs in observations {
        if let Some(city) = obs.city.as_deref() {
            by_city.entry(city).or_default().push(obs);
        }
    }

    let mut missing_wages = Vec::new();
    let mut cities = Vec::with_capacity(registry.len());

    for city in registry {
        let minimum_wage = match wages.hourly_wage(&city.province) {
            Some(wage) => wage,
            None => {
                missing_wages.push(MissingWage {
                    city: city.name.clone(),
                    province: city.province.clone(),
                });
                0.0
            }
        };

        let city_observations = by_city
            .get(city.name.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();

        let aggregate = aggregate_city(city, city_observations, minimum_wage);
        tracing::debug!(
            city = %city.name,
            sample_size = aggregate.sample_size,
            affordability_index = aggregate.affordability_index,
            "City aggregated"
        );
        cities.push(aggregate);
    }

    let registered: BTreeSet<&str> = registry.iter().map(|c| c.name.as_str()).collect();
    let unmatched_cities = by_city
        .keys()
        .filter(|name| !registered.contains(*name))
        .map(|name| name.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    AggregationOutcome {
        cities,
        missing_wages,
        unmatched_cities,
    }
}

impl DatasetSummary {
    pub fn from_cities(cities: &[CityAggregate]) -> Self {
        let range = |values: Vec<f64>| {
            if values.is_empty() {
                return None;
            }
            let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Some((lo, hi))
        };

        DatasetSummary {
            cities_with_data: cities.iter().filter(|c| c.sample_size > 0).count(),
            total_cities: cities.len(),
            total_samples: cities.iter().map(|c| c.sample_size).sum(),
            regular_mean_range: range(
                cities
                    .iter()
                    .filter_map(|c| c.prices.regular.map(|s| s.mean))
                    .collect(),
            ),
            affordability_range: range(
                cities
                    .iter()
                    .map(|c| c.affordability_index)
                    .filter(|a| *a > 0.0)
                    .collect(),
            ),
        }
    }
}

impl CityDataset {
    pub fn new(last_updated: NaiveDate, cities: Vec<CityAggregate>) -> Self {
        CityDataset {
            last_updated: last_updated.format("%Y-%m-%d").to_string(),
            data_version: DATA_VERSION.to_string(),
            cities,
        }
    }
}
