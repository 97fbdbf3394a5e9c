//! Findings: the annotation stream produced by the validators.

use crate::observation::{ObservationKey, Size};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("ERROR"),
            Severity::Warning => f.write_str("WARNING"),
        }
    }
}

/// Which rule fired, with the offending values.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    MissingField { field: &'static str },
    InvalidConfidence { value: String },
    NoPrices,
    MissingRegular,
    PriceBelowMinimum { size: Size, price: f64, min: f64 },
    PriceAboveMaximum { size: Size, price: f64, max: f64 },
    SizeOrder { smaller: (Size, f64), larger: (Size, f64) },
    InvalidDate { value: String },
    FutureDate { value: String },
    StaleDate { value: String, days: i64 },
    UrlNotString,
    InvalidUrl { value: String },
    Outlier { price: f64, z_score: f64, city_mean: f64 },
    Duplicate,
}

impl Check {
    pub fn severity(&self) -> Severity {
        match self {
            Check::MissingRegular
            | Check::PriceBelowMinimum { .. }
            | Check::PriceAboveMaximum { .. }
            | Check::SizeOrder { .. }
            | Check::StaleDate { .. }
            | Check::Outlier { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Stable identifier, used as the `rule` column of the findings CSV.
    pub fn rule_id(&self) -> &'static str {
        match self {
            Check::MissingField { .. } => "missing_field",
            Check::InvalidConfidence { .. } => "invalid_confidence",
            Check::NoPrices => "no_prices",
            Check::MissingRegular => "missing_regular",
            Check::PriceBelowMinimum { .. } => "price_below_minimum",
            Check::PriceAboveMaximum { .. } => "price_above_maximum",
            Check::SizeOrder { .. } => "size_order",
            Check::InvalidDate { .. } => "invalid_date",
            Check::FutureDate { .. } => "future_date",
            Check::StaleDate { .. } => "stale_date",
            Check::UrlNotString => "url_not_string",
            Check::InvalidUrl { .. } => "invalid_url",
            Check::Outlier { .. } => "outlier",
            Check::Duplicate => "duplicate",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::MissingField { field } => write!(f, "Missing required field: {}", field),
            Check::InvalidConfidence { value } => write!(
                f,
                "Invalid confidence value: '{}' (must be high/medium/low)",
                value
            ),
            Check::NoPrices => f.write_str("No prices provided"),
            Check::MissingRegular => f.write_str("Missing regular size price"),
            Check::PriceBelowMinimum { size, price, min } => write!(
                f,
                "{} price ${:.2} is below minimum (${:.2})",
                size, price, min
            ),
            Check::PriceAboveMaximum { size, price, max } => write!(
                f,
                "{} price ${:.2} is above maximum (${:.2})",
                size, price, max
            ),
            Check::SizeOrder { smaller, larger } => write!(
                f,
                "{} (${:.2}) >= {} (${:.2})",
                smaller.0, smaller.1, larger.0, larger.1
            ),
            Check::InvalidDate { value } => write!(
                f,
                "Invalid date format: '{}' (expected YYYY-MM-DD)",
                value
            ),
            Check::FutureDate { value } => write!(f, "Extraction date {} is in the future", value),
            Check::StaleDate { value, days } => write!(
                f,
                "Data is stale (extracted {}, over {} days ago)",
                value, days
            ),
            Check::UrlNotString => f.write_str("source_url must be a string or null"),
            Check::InvalidUrl { value } => write!(
                f,
                "Invalid URL format: '{}' (must start with http:// or https://)",
                value
            ),
            Check::Outlier {
                price,
                z_score,
                city_mean,
            } => write!(
                f,
                "Outlier: ${:.2} is {:.1} std devs from city mean ${:.2}",
                price, z_score, city_mean
            ),
            Check::Duplicate => f.write_str("Duplicate restaurant entry"),
        }
    }
}

/// One validation outcome attached to a `(city, restaurant_name)` identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub rule: &'static str,
    pub city: String,
    pub restaurant_name: String,
    pub message: String,
}

impl Finding {
    pub fn new(key: &ObservationKey, check: Check) -> Self {
        Finding {
            severity: check.severity(),
            rule: check.rule_id(),
            city: key.city.clone(),
            restaurant_name: key.restaurant_name.clone(),
            message: check.to_string(),
        }
    }

    pub fn key(&self) -> ObservationKey {
        ObservationKey {
            city: self.city.clone(),
            restaurant_name: self.restaurant_name.clone(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}/{}: {}",
            self.severity, self.city, self.restaurant_name, self.message
        )
    }
}
