use crate::observation::{ObservationKey, RawObservation};
use crate::validators::findings::{Finding, Severity};
use std::collections::HashSet;

/// Which findings exclude an observation from aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExclusionPolicy {
    /// Only error-severity findings exclude.
    #[default]
    Errors,
    /// Any finding excludes, warnings included.
    Strict,
}

impl ExclusionPolicy {
    fn excludes(&self, finding: &Finding) -> bool {
        match self {
            ExclusionPolicy::Errors => finding.severity == Severity::Error,
            ExclusionPolicy::Strict => true,
        }
    }
}

/// Result of one validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    /// Sorted by `(city, restaurant_name)`; emission order is kept within a key.
    pub findings: Vec<Finding>,
    /// Surviving observations in input order.
    pub kept: Vec<RawObservation>,
    /// Excluded observations in input order.
    pub dropped: Vec<RawObservation>,
    pub policy: ExclusionPolicy,
}

impl ValidationReport {
    pub(crate) fn build(
        observations: &[RawObservation],
        mut findings: Vec<Finding>,
        policy: ExclusionPolicy,
    ) -> Self {
        let excluded: HashSet<ObservationKey> = findings
            .iter()
            .filter(|f| policy.excludes(f))
            .map(Finding::key)
            .collect();

        let (dropped, kept): (Vec<_>, Vec<_>) = observations
            .iter()
            .cloned()
            .partition(|obs| excluded.contains(&obs.key()));

        findings.sort_by(|a, b| {
            (a.city.as_str(), a.restaurant_name.as_str())
                .cmp(&(b.city.as_str(), b.restaurant_name.as_str()))
        });

        ValidationReport {
            findings,
            kept,
            dropped,
            policy,
        }
    }

    pub fn error_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings.len() - self.error_count()
    }

    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(Finding::is_error)
    }

    /// `true` when the run should signal failure to the caller: any structural
    /// error, or any warning at all under [`ExclusionPolicy::Strict`].
    pub fn is_failure(&self) -> bool {
        match self.policy {
            ExclusionPolicy::Errors => self.has_errors(),
            ExclusionPolicy::Strict => !self.findings.is_empty(),
        }
    }

    pub fn total(&self) -> usize {
        self.kept.len() + self.dropped.len()
    }
}
