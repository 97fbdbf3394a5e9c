//! Price observation validation.
//!
//! Each observation is checked on its own (required fields, confidence, price
//! bounds and ordering, dates, URLs), then the batch is checked as a whole
//! (per-city regular price outliers, duplicate identities). Findings never
//! mutate observations; the [`ValidationReport`] partitions the input into kept
//! and dropped according to an [`ExclusionPolicy`].

pub mod batch;
pub mod checks;
pub mod findings;
pub mod report;

pub use findings::{Check, Finding, Severity};
pub use report::{ExclusionPolicy, ValidationReport};

use crate::config::ValidationConfig;
use crate::observation::RawObservation;
use chrono::NaiveDate;

/// Validates a batch of observations as of `today`.
///
/// Total over any input: malformed records turn into findings, never errors.
pub fn validate(
    observations: &[RawObservation],
    today: NaiveDate,
    config: &ValidationConfig,
    policy: ExclusionPolicy,
) -> ValidationReport {
    let mut findings: Vec<Finding> = observations
        .iter()
        .flat_map(|obs| checks::check_observation(obs, today, config))
        .collect();

    findings.extend(batch::find_outliers(observations, config));
    findings.extend(batch::find_duplicates(observations));

    ValidationReport::build(observations, findings, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::PriceMap;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn obs(city: &str, name: &str, small: Option<f64>, regular: Option<f64>) -> RawObservation {
        RawObservation {
            city: Some(city.to_string()),
            restaurant_name: Some(name.to_string()),
            extraction_date: Some("2024-05-15".to_string()),
            prices: Some(PriceMap {
                small,
                regular,
                large: None,
            }),
            confidence: Some("medium".to_string()),
            ..Default::default()
        }
    }

    fn run(batch: &[RawObservation], policy: ExclusionPolicy) -> ValidationReport {
        validate(batch, today(), &ValidationConfig::default(), policy)
    }

    fn names(observations: &[RawObservation]) -> Vec<&str> {
        observations
            .iter()
            .map(|o| o.restaurant_name.as_deref().unwrap_or("-"))
            .collect()
    }

    #[test]
    fn test_warnings_do_not_exclude() {
        let batch = vec![obs("Quebec", "Chez Ashton", Some(13.0), Some(12.0))];

        let report = run(&batch, ExclusionPolicy::Errors);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.error_count(), 0);
        assert_eq!(names(&report.kept), vec!["Chez Ashton"]);
        assert!(!report.is_failure());
    }

    #[test]
    fn test_strict_policy_excludes_warnings() {
        let batch = vec![
            obs("Quebec", "Chez Ashton", Some(13.0), Some(12.0)),
            obs("Quebec", "Frites Alors", Some(9.0), Some(12.0)),
        ];

        let report = run(&batch, ExclusionPolicy::Strict);
        assert_eq!(names(&report.kept), vec!["Frites Alors"]);
        assert_eq!(names(&report.dropped), vec!["Chez Ashton"]);
        assert!(report.is_failure());
    }

    #[test]
    fn test_missing_identity_fields_are_dropped() {
        let mut no_name = obs("Ottawa", "x", None, Some(12.0));
        no_name.restaurant_name = None;
        let mut no_date = obs("Ottawa", "No Date", None, Some(12.0));
        no_date.extraction_date = None;
        let mut no_prices = obs("Ottawa", "No Prices", None, Some(12.0));
        no_prices.prices = None;
        let fine = obs("Ottawa", "Fine", None, Some(12.0));

        let report = run(&[no_name, no_date, no_prices, fine], ExclusionPolicy::Errors);
        assert_eq!(names(&report.kept), vec!["Fine"]);
        assert_eq!(report.dropped.len(), 3);
        assert!(report.has_errors());
    }

    #[test]
    fn test_duplicate_key_drops_every_occurrence() {
        let batch = vec![
            obs("Toronto", "Poutini's", None, Some(11.0)),
            obs("Toronto", "Poutini's", None, Some(11.5)),
            obs("Toronto", "Other", None, Some(12.0)),
        ];

        let report = run(&batch, ExclusionPolicy::Errors);
        assert_eq!(report.error_count(), 1);
        assert_eq!(names(&report.kept), vec!["Other"]);
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn test_findings_sorted_by_city_then_restaurant() {
        let batch = vec![
            obs("Winnipeg", "Zed", None, None),
            obs("Calgary", "Bee", Some(30.0), Some(12.0)),
            obs("Calgary", "Ay", None, None),
        ];

        let report = run(&batch, ExclusionPolicy::Errors);
        let keys: Vec<_> = report
            .findings
            .iter()
            .map(|f| (f.city.as_str(), f.restaurant_name.as_str(), f.rule))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("Calgary", "Ay", "no_prices"),
                ("Calgary", "Bee", "price_above_maximum"),
                ("Calgary", "Bee", "size_order"),
                ("Winnipeg", "Zed", "no_prices"),
            ]
        );
    }

    #[test]
    fn test_kept_preserves_input_order() {
        let batch = vec![
            obs("Victoria", "C", None, Some(12.0)),
            obs("Halifax", "A", None, Some(12.0)),
            obs("Victoria", "B", None, Some(12.0)),
        ];

        let report = run(&batch, ExclusionPolicy::Errors);
        assert_eq!(names(&report.kept), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let batch = vec![
            obs("Victoria", "C", Some(14.0), Some(12.0)),
            obs("Victoria", "C", None, None),
            obs("Halifax", "A", None, Some(40.0)),
        ];

        let first = run(&batch, ExclusionPolicy::Errors);
        let second = run(&batch, ExclusionPolicy::Errors);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_batch() {
        let report = run(&[], ExclusionPolicy::Errors);
        assert!(report.findings.is_empty());
        assert!(report.kept.is_empty());
        assert!(!report.is_failure());
    }
}
