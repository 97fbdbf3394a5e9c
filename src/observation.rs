//! Raw restaurant price observations as they arrive from the extraction stage.
//!
//! Every field is optional so a partially structured record still deserializes;
//! the validators decide what a missing field means.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stand-in used for a missing city or restaurant name in findings and identity keys.
pub const UNKNOWN: &str = "Unknown";

/// One merchant's recorded prices at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub restaurant_name: Option<String>,
    #[serde(default)]
    pub extraction_date: Option<String>,
    #[serde(default)]
    pub prices: Option<PriceMap>,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub source_url: Option<serde_json::Value>,

    // passthrough (place_id, notes, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RawObservation {
    /// Identity used for duplicate detection and exclusion matching.
    pub fn key(&self) -> ObservationKey {
        ObservationKey {
            city: self.city.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            restaurant_name: self
                .restaurant_name
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }

    /// Price for `size`, if the observation carries one.
    pub fn price(&self, size: Size) -> Option<f64> {
        self.prices.as_ref().and_then(|p| p.get(size))
    }
}

/// Case-sensitive `(city, restaurant_name)` identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObservationKey {
    pub city: String,
    pub restaurant_name: String,
}

/// Prices keyed by portion size. Absent and `null` both read as `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceMap {
    #[serde(default)]
    pub small: Option<f64>,
    #[serde(default)]
    pub regular: Option<f64>,
    #[serde(default)]
    pub large: Option<f64>,
}

impl PriceMap {
    pub fn get(&self, size: Size) -> Option<f64> {
        match size {
            Size::Small => self.small,
            Size::Regular => self.regular,
            Size::Large => self.large,
        }
    }

    /// Present prices in size order.
    pub fn present(&self) -> impl Iterator<Item = (Size, f64)> + '_ {
        Size::ALL
            .into_iter()
            .filter_map(move |size| self.get(size).map(|price| (size, price)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Small,
    Regular,
    Large,
}

impl Size {
    pub const ALL: [Size; 3] = [Size::Small, Size::Regular, Size::Large];
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Size::Small => "Small",
            Size::Regular => "Regular",
            Size::Large => "Large",
        };
        f.write_str(label)
    }
}

/// How sure the extraction stage was about the prices it recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            other => Err(other.to_string()),
        }
    }
}
