//! Checks that look at a single observation in isolation.

use crate::config::ValidationConfig;
use crate::observation::{Confidence, RawObservation, Size};
use crate::validators::findings::{Check, Finding};
use chrono::NaiveDate;

/// Runs every per-observation check and returns the findings in rule order.
pub fn check_observation(
    obs: &RawObservation,
    today: NaiveDate,
    config: &ValidationConfig,
) -> Vec<Finding> {
    let key = obs.key();
    let mut checks = Vec::new();

    checks.extend(required_fields(obs));
    checks.extend(confidence(obs));
    checks.extend(prices(obs, config));
    checks.extend(extraction_date(obs, today, config));
    checks.extend(source_url(obs));

    checks
        .into_iter()
        .map(|check| Finding::new(&key, check))
        .collect()
}

fn required_fields(obs: &RawObservation) -> Vec<Check> {
    let present = [
        ("city", obs.city.is_some()),
        ("restaurant_name", obs.restaurant_name.is_some()),
        ("extraction_date", obs.extraction_date.is_some()),
        ("prices", obs.prices.is_some()),
        ("confidence", obs.confidence.is_some()),
    ];

    present
        .into_iter()
        .filter(|(_, ok)| !ok)
        .map(|(field, _)| Check::MissingField { field })
        .collect()
}

fn confidence(obs: &RawObservation) -> Option<Check> {
    let value = obs.confidence.as_deref()?;
    match value.parse::<Confidence>() {
        Ok(_) => None,
        Err(value) => Some(Check::InvalidConfidence { value }),
    }
}

fn prices(obs: &RawObservation, config: &ValidationConfig) -> Vec<Check> {
    let prices = obs.prices.unwrap_or_default();
    if prices.present().next().is_none() {
        return vec![Check::NoPrices];
    }

    let mut checks = Vec::new();

    if prices.regular.is_none() {
        checks.push(Check::MissingRegular);
    }

    for (size, price) in prices.present() {
        if price < config.min_price {
            checks.push(Check::PriceBelowMinimum {
                size,
                price,
                min: config.min_price,
            });
        }
        if price > config.max_price {
            checks.push(Check::PriceAboveMaximum {
                size,
                price,
                max: config.max_price,
            });
        }
    }

    for (smaller, larger) in [(Size::Small, Size::Regular), (Size::Regular, Size::Large)] {
        if let (Some(a), Some(b)) = (prices.get(smaller), prices.get(larger)) {
            if a >= b {
                checks.push(Check::SizeOrder {
                    smaller: (smaller, a),
                    larger: (larger, b),
                });
            }
        }
    }

    checks
}

fn extraction_date(
    obs: &RawObservation,
    today: NaiveDate,
    config: &ValidationConfig,
) -> Option<Check> {
    // absence is reported by required_fields
    let value = obs.extraction_date.as_deref()?;

    let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") else {
        return Some(Check::InvalidDate {
            value: value.to_string(),
        });
    };

    if date > today {
        return Some(Check::FutureDate {
            value: value.to_string(),
        });
    }

    if (today - date).num_days() > config.stale_days {
        return Some(Check::StaleDate {
            value: value.to_string(),
            days: config.stale_days,
        });
    }

    None
}

fn source_url(obs: &RawObservation) -> Option<Check> {
    match obs.source_url.as_ref()? {
        serde_json::Value::String(url) => {
            if url.starts_with("http://") || url.starts_with("https://") {
                None
            } else {
                Some(Check::InvalidUrl { value: url.clone() })
            }
        }
        _ => Some(Check::UrlNotString),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::PriceMap;
    use crate::validators::findings::Severity;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn observation(small: Option<f64>, regular: Option<f64>, large: Option<f64>) -> RawObservation {
        RawObservation {
            city: Some("Montreal".to_string()),
            restaurant_name: Some("La Banquise".to_string()),
            extraction_date: Some("2024-05-01".to_string()),
            prices: Some(PriceMap {
                small,
                regular,
                large,
            }),
            confidence: Some("high".to_string()),
            source_url: Some(serde_json::json!("https://labanquise.com/menu")),
            ..Default::default()
        }
    }

    fn run(obs: &RawObservation) -> Vec<Finding> {
        check_observation(obs, today(), &ValidationConfig::default())
    }

    fn rules(findings: &[Finding]) -> Vec<&'static str> {
        findings.iter().map(|f| f.rule).collect()
    }

    #[test]
    fn test_clean_observation_has_no_findings() {
        let obs = observation(Some(9.0), Some(12.0), Some(15.0));
        assert!(run(&obs).is_empty());
    }

    #[test]
    fn test_each_missing_field_is_one_error() {
        let obs = RawObservation {
            city: Some("Montreal".to_string()),
            ..Default::default()
        };

        let findings = run(&obs);
        let missing: Vec<_> = findings
            .iter()
            .filter(|f| f.rule == "missing_field")
            .map(|f| f.message.as_str())
            .collect();

        assert_eq!(
            missing,
            vec![
                "Missing required field: restaurant_name",
                "Missing required field: extraction_date",
                "Missing required field: prices",
                "Missing required field: confidence",
            ]
        );
        assert!(findings.iter().all(|f| f.restaurant_name == "Unknown"));
    }

    #[test]
    fn test_missing_prices_also_reports_no_prices() {
        let mut obs = observation(None, Some(10.0), None);
        obs.prices = None;

        let findings = run(&obs);
        assert_eq!(rules(&findings), vec!["missing_field", "no_prices"]);
    }

    #[test]
    fn test_invalid_confidence() {
        let mut obs = observation(None, Some(10.0), None);
        obs.confidence = Some("certain".to_string());

        let findings = run(&obs);
        assert_eq!(rules(&findings), vec!["invalid_confidence"]);
        assert_eq!(findings[0].severity, Severity::Error);
        assert!(findings[0].message.contains("'certain'"));
    }

    #[test]
    fn test_empty_price_map_short_circuits_price_checks() {
        let obs = observation(None, None, None);

        let findings = run(&obs);
        assert_eq!(rules(&findings), vec!["no_prices"]);
    }

    #[test]
    fn test_missing_regular_is_warning() {
        let obs = observation(Some(8.0), None, Some(14.0));

        let findings = run(&obs);
        assert_eq!(rules(&findings), vec!["missing_regular"]);
        assert_eq!(findings[0].severity, Severity::Warning);
    }

    #[test]
    fn test_bounds_warn_per_size() {
        let obs = observation(Some(4.5), Some(12.0), Some(26.0));

        let findings = run(&obs);
        assert_eq!(
            rules(&findings),
            vec!["price_below_minimum", "price_above_maximum"]
        );
        assert_eq!(findings[0].message, "Small price $4.50 is below minimum ($5.00)");
        assert_eq!(findings[1].message, "Large price $26.00 is above maximum ($25.00)");
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let obs = observation(Some(5.0), Some(12.0), Some(25.0));
        assert!(run(&obs).is_empty());
    }

    #[test]
    fn test_small_not_below_regular_warns_once() {
        let obs = observation(Some(12.0), Some(12.0), Some(15.0));

        let findings = run(&obs);
        assert_eq!(rules(&findings), vec!["size_order"]);
        assert_eq!(findings[0].severity, Severity::Warning);
    }

    #[test]
    fn test_both_orderings_can_fire() {
        let obs = observation(Some(14.0), Some(12.0), Some(10.0));

        let findings = run(&obs);
        assert_eq!(rules(&findings), vec!["size_order", "size_order"]);
        assert_eq!(findings[0].message, "Small ($14.00) >= Regular ($12.00)");
        assert_eq!(findings[1].message, "Regular ($12.00) >= Large ($10.00)");
    }

    #[test]
    fn test_malformed_date() {
        let mut obs = observation(None, Some(10.0), None);
        obs.extraction_date = Some("01/05/2024".to_string());

        let findings = run(&obs);
        assert_eq!(rules(&findings), vec!["invalid_date"]);
        assert!(findings[0].is_error());
    }

    #[test]
    fn test_future_date_is_error_and_not_stale() {
        let mut obs = observation(None, Some(10.0), None);
        obs.extraction_date = Some("2024-06-02".to_string());

        let findings = run(&obs);
        assert_eq!(rules(&findings), vec!["future_date"]);
    }

    #[test]
    fn test_today_is_not_future() {
        let mut obs = observation(None, Some(10.0), None);
        obs.extraction_date = Some("2024-06-01".to_string());

        assert!(run(&obs).is_empty());
    }

    #[test]
    fn test_staleness_threshold() {
        let mut obs = observation(None, Some(10.0), None);

        // 2023-12-04 is exactly 180 days before 2024-06-01
        obs.extraction_date = Some("2023-12-04".to_string());
        assert!(run(&obs).is_empty());

        obs.extraction_date = Some("2023-12-03".to_string());
        let findings = run(&obs);
        assert_eq!(rules(&findings), vec!["stale_date"]);
        assert_eq!(findings[0].severity, Severity::Warning);
    }

    #[test]
    fn test_url_checks() {
        let mut obs = observation(None, Some(10.0), None);

        obs.source_url = None;
        assert!(run(&obs).is_empty());

        obs.source_url = Some(serde_json::json!("http://example.com"));
        assert!(run(&obs).is_empty());

        obs.source_url = Some(serde_json::json!("ftp://example.com"));
        assert_eq!(rules(&run(&obs)), vec!["invalid_url"]);

        obs.source_url = Some(serde_json::json!(42));
        assert_eq!(rules(&run(&obs)), vec!["url_not_string"]);
    }
}
