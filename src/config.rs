use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Thresholds used by the price validators.
///
/// Stored as a plain JSON object on disk; any omitted key keeps its default:
/// ```json
/// {
///   "min_price": 5.0,
///   "max_price": 25.0,
///   "stale_days": 180,
///   "outlier_z_threshold": 2.0,
///   "outlier_min_samples": 3
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub min_price: f64,
    pub max_price: f64,
    pub stale_days: i64,
    pub outlier_z_threshold: f64,
    pub outlier_min_samples: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_price: 5.0,
            max_price: 25.0,
            stale_days: 180,
            outlier_z_threshold: 2.0,
            outlier_min_samples: 3,
        }
    }
}

impl ValidationConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading validation config {}", path))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing validation config {}", path))?;
        Ok(config)
    }
}
