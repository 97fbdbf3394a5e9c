//! Output formatting and persistence for validation and aggregation results.
//!
//! Supports logging findings, pretty JSON snapshots, and CSV append.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::observation::RawObservation;
use crate::validators::{Finding, Severity};
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// The validated-observations snapshot written after a validation pass.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidatedSnapshot {
    pub validation_date: String,
    pub prices: Vec<RawObservation>,
}

/// Emits one log event per finding, at `error` or `warn` level.
pub fn log_findings(findings: &[Finding]) {
    for finding in findings {
        match finding.severity {
            Severity::Error => error!(
                city = %finding.city,
                restaurant = %finding.restaurant_name,
                rule = finding.rule,
                "{}",
                finding.message
            ),
            Severity::Warning => warn!(
                city = %finding.city,
                restaurant = %finding.restaurant_name,
                rule = finding.rule,
                "{}",
                finding.message
            ),
        }
    }
}

/// Writes `value` as pretty-printed JSON, creating parent directories.
pub fn write_json(path: &str, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
    }

    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json + "\n").with_context(|| format!("writing {}", path))?;
    debug!(path, "JSON written");
    Ok(())
}

/// Appends findings as rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_findings(path: &str, findings: &[Finding]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = findings.len(), "Appending findings CSV");

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("opening {}", path))?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for finding in findings {
        writer.serialize(finding)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::ObservationKey;
    use crate::validators::Check;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn findings() -> Vec<Finding> {
        let key = ObservationKey {
            city: "Montreal".to_string(),
            restaurant_name: "La Banquise".to_string(),
        };
        vec![
            Finding::new(&key, Check::MissingRegular),
            Finding::new(&key, Check::Duplicate),
        ]
    }

    #[test]
    fn test_log_findings_does_not_panic() {
        log_findings(&findings());
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = temp_path("poutine_index_test_nested");
        let _ = fs::remove_dir_all(&dir);
        let path = format!("{}/data/snapshot.json", dir);

        let snapshot = ValidatedSnapshot {
            validation_date: "2024-06-01".to_string(),
            prices: vec![],
        };
        write_json(&path, &snapshot).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let back: ValidatedSnapshot = serde_json::from_str(&content).unwrap();
        assert_eq!(back.validation_date, "2024-06-01");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_append_findings_writes_header_once() {
        let path = temp_path("poutine_index_test_findings.csv");
        let _ = fs::remove_file(&path);

        append_findings(&path, &findings()).unwrap();
        append_findings(&path, &findings()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "severity,rule,city,restaurant_name,message");
        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[1],
            "warning,missing_regular,Montreal,La Banquise,Missing regular size price"
        );

        fs::remove_file(&path).unwrap();
    }
}
