//! JSON decoders for the pipeline's input documents.

use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;

use crate::analyzers::types::{City, WageTable};
use crate::observation::RawObservation;

#[derive(Deserialize)]
struct PriceDocument {
    #[serde(default)]
    prices: Vec<RawObservation>,
}

#[derive(Deserialize)]
struct CityDocument {
    cities: Vec<City>,
}

#[derive(Deserialize)]
struct WageEntry {
    hourly_wage: f64,
}

#[derive(Deserialize)]
struct WageDocument {
    wages: HashMap<String, WageEntry>,
}

/// Decodes a `{"prices": [...]}` document (raw or validated snapshot).
///
/// A document without a `prices` key decodes to an empty batch.
pub fn parse_observations(bytes: &[u8]) -> Result<Vec<RawObservation>> {
    let doc: PriceDocument = serde_json::from_slice(bytes)?;
    Ok(doc.prices)
}

/// Decodes the `{"cities": [...]}` registry, keeping file order.
pub fn parse_registry(bytes: &[u8]) -> Result<Vec<City>> {
    let doc: CityDocument = serde_json::from_slice(bytes)?;
    Ok(doc.cities)
}

/// Decodes `{"wages": {"ON": {"hourly_wage": 17.2, ...}, ...}}` into a [`WageTable`].
pub fn parse_wages(bytes: &[u8]) -> Result<WageTable> {
    let doc: WageDocument = serde_json::from_slice(bytes)?;
    Ok(doc
        .wages
        .into_iter()
        .map(|(province, entry)| (province, entry.hourly_wage))
        .collect())
}
