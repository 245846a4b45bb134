//! Anomaly Ranking
//!
//! Surfaces the metrics that moved most between two periods.

use kpi_core::{round_to, AnomalyItem, ChangeSet, DriverSummary, Severity};

pub const MAX_ANOMALIES: usize = 3;
/// |change| at or above this is HIGH (percent units)
pub const HIGH_SEVERITY_PCT: f64 = 15.0;
/// |change| at or above this is MEDIUM (percent units)
pub const MEDIUM_SEVERITY_PCT: f64 = 8.0;

pub fn severity_for(pct_change: f64) -> Severity {
    let magnitude = pct_change.abs();
    if magnitude >= HIGH_SEVERITY_PCT {
        Severity::High
    } else if magnitude >= MEDIUM_SEVERITY_PCT {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Top movers by absolute change.
///
/// Metrics are sorted (stably, from canonical order) by magnitude with
/// unmeasurable changes counted as 0. The top three are kept and unmeasurable
/// ones are then dropped, so the result may hold fewer than three items.
pub fn rank_anomalies(changes: &ChangeSet) -> Vec<AnomalyItem> {
    let mut entries = changes.canonical_entries().to_vec();
    entries.sort_by(|a, b| {
        let a_mag = a.1.map(f64::abs).unwrap_or(0.0);
        let b_mag = b.1.map(f64::abs).unwrap_or(0.0);
        b_mag.partial_cmp(&a_mag).unwrap_or(std::cmp::Ordering::Equal)
    });

    entries
        .into_iter()
        .take(MAX_ANOMALIES)
        .filter_map(|(metric, pct)| {
            pct.map(|pct| AnomalyItem {
                metric,
                pct_change: round_to(pct, 2),
                severity: severity_for(pct),
            })
        })
        .collect()
}

/// Anomalies for a driver summary; empty when the summary is not ok.
pub fn detect_anomalies(summary: &DriverSummary) -> Vec<AnomalyItem> {
    if !summary.is_ok() {
        return Vec::new();
    }
    rank_anomalies(&summary.changes_pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kpi_core::Metric;

    fn to_changes(items: &[AnomalyItem]) -> ChangeSet {
        items
            .iter()
            .fold(ChangeSet::default(), |set, item| set.with(item.metric, Some(item.pct_change)))
    }

    #[test]
    fn test_ranks_by_magnitude() {
        let changes = ChangeSet {
            revenue: Some(-20.0),
            orders: Some(-5.0),
            customers: Some(-3.0),
            aov: Some(-16.0),
        };
        let ranked = rank_anomalies(&changes);
        let metrics: Vec<Metric> = ranked.iter().map(|a| a.metric).collect();
        assert_eq!(metrics, vec![Metric::Revenue, Metric::Aov, Metric::Orders]);
        assert_eq!(ranked[0].severity, Severity::High);
        assert_eq!(ranked[1].severity, Severity::High);
        assert_eq!(ranked[2].severity, Severity::Low);
    }

    #[test]
    fn test_ties_keep_canonical_order() {
        let changes = ChangeSet {
            revenue: Some(4.0),
            orders: Some(-9.0),
            customers: Some(9.0),
            aov: Some(9.0),
        };
        let metrics: Vec<Metric> = rank_anomalies(&changes).iter().map(|a| a.metric).collect();
        assert_eq!(metrics, vec![Metric::Orders, Metric::Aov, Metric::Customers]);
    }

    #[test]
    fn test_absent_changes_are_dropped() {
        let changes = ChangeSet {
            revenue: None,
            orders: Some(12.0),
            customers: None,
            aov: None,
        };
        let ranked = rank_anomalies(&changes);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].metric, Metric::Orders);
        assert_eq!(ranked[0].severity, Severity::Medium);
        assert!(rank_anomalies(&ChangeSet::default()).is_empty());
    }

    #[test]
    fn test_reranking_is_idempotent() {
        let changes = ChangeSet {
            revenue: Some(-8.0),
            orders: Some(8.0),
            customers: Some(-2.345),
            aov: Some(-15.5),
        };
        let first = rank_anomalies(&changes);
        let second = rank_anomalies(&to_changes(&first));
        assert_eq!(first, second);
    }

    #[test]
    fn test_rounds_to_two_places() {
        let changes = ChangeSet {
            revenue: Some(-12.3456),
            ..ChangeSet::default()
        };
        assert_eq!(rank_anomalies(&changes)[0].pct_change, -12.35);
    }

    #[test]
    fn test_not_ok_summary_has_no_anomalies() {
        assert!(detect_anomalies(&DriverSummary::insufficient("no data")).is_empty());
    }
}
