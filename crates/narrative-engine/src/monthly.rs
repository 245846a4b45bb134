//! Monthly Report
//!
//! Compares two consecutive periods and explains the revenue move in plain
//! language: what changed, the primary driver, risk flags and a
//! recommendation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use decision_engine::attribution::{attribute_driver, revenue_summary};
use decision_engine::MATERIAL_DROP_PCT;
use kpi_core::{ChangeSet, MainDriver, MetricSnapshot};

const NO_RISK: &str = "No major risk signals detected.";

/// Raw numbers behind a monthly report, percentages in percent units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyMeta {
    pub from_period: String,
    pub to_period: String,
    pub revenue_change: f64,
    pub revenue_change_pct: Option<f64>,
    pub orders_change_pct: Option<f64>,
    pub aov_change_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub summary: String,
    pub driver: String,
    pub risk: String,
    pub recommendation: String,
    pub meta: MonthlyMeta,
    pub generated_at: DateTime<Utc>,
}

fn driver_text(driver: MainDriver) -> String {
    match driver {
        MainDriver::Orders => "Primary driver: Orders".to_string(),
        MainDriver::Aov => "Primary driver: AOV".to_string(),
        MainDriver::Undetermined => "Primary driver unclear".to_string(),
    }
}

fn recommendation_for(driver: MainDriver) -> &'static str {
    match driver {
        MainDriver::Orders => "Focus on demand levers: acquisition, conversion funnel, and retention.",
        MainDriver::Aov => {
            "Focus on pricing/mix: reduce excessive discounting, improve upsell/cross-sell, and optimize product mix."
        }
        MainDriver::Undetermined => "Collect more months of data to confidently identify the primary driver.",
    }
}

fn risk_flags(base: &MetricSnapshot, target: &MetricSnapshot, changes: &ChangeSet) -> Vec<&'static str> {
    let mut flags = Vec::new();
    if changes.aov.map(|c| c <= MATERIAL_DROP_PCT).unwrap_or(false) {
        flags.push("AOV dropped materially (possible discounting or weaker pricing).");
    }
    if changes.orders.map(|c| c <= MATERIAL_DROP_PCT).unwrap_or(false) {
        flags.push("Orders dropped materially (possible demand or funnel issue).");
    }
    if target.customers < base.customers {
        flags.push("Customers decreased (possible retention/acquisition issue).");
    }
    flags
}

/// Build the report comparing `base` (earlier) to `target` (later).
pub fn build_monthly_report(base: &MetricSnapshot, target: &MetricSnapshot) -> MonthlyReport {
    let changes = ChangeSet::between(base, target);
    let driver = attribute_driver(&changes);

    let flags = risk_flags(base, target, &changes);
    let risk = if flags.is_empty() {
        NO_RISK.to_string()
    } else {
        flags.join(" | ")
    };

    MonthlyReport {
        summary: revenue_summary(base, target, &changes),
        driver: driver_text(driver),
        risk,
        recommendation: recommendation_for(driver).to_string(),
        meta: MonthlyMeta {
            from_period: base.period_id.clone(),
            to_period: target.period_id.clone(),
            revenue_change: target.revenue - base.revenue,
            revenue_change_pct: changes.revenue,
            orders_change_pct: changes.orders,
            aov_change_pct: changes.aov,
        },
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aov_led_decline() {
        let base = MetricSnapshot::with_aov("2024-01", 10_000.0, 100.0, 80.0, 100.0);
        let target = MetricSnapshot::with_aov("2024-02", 8_000.0, 95.0, 77.0, 84.0);
        let report = build_monthly_report(&base, &target);

        assert_eq!(report.summary, "From 2024-01 to 2024-02, revenue changed by -2000 (-20.0%).");
        assert_eq!(report.driver, "Primary driver: AOV");
        assert_eq!(
            report.risk,
            "AOV dropped materially (possible discounting or weaker pricing). | Customers decreased (possible retention/acquisition issue)."
        );
        assert!(report.recommendation.starts_with("Focus on pricing/mix"));
        assert_eq!(report.meta.revenue_change, -2000.0);
        assert_eq!(report.meta.from_period, "2024-01");
    }

    #[test]
    fn test_growth_without_flags() {
        let base = MetricSnapshot::with_aov("2024-01", 10_000.0, 100.0, 80.0, 100.0);
        let target = MetricSnapshot::with_aov("2024-02", 12_000.0, 115.0, 90.0, 104.35);
        let report = build_monthly_report(&base, &target);

        assert_eq!(report.driver, "Primary driver: Orders");
        assert_eq!(report.risk, NO_RISK);
    }

    #[test]
    fn test_orders_flag_shares_synthesizer_threshold() {
        use crate::synthesizer::synthesize;
        use kpi_core::{Metric, NarrativeStyle};

        let base = MetricSnapshot::with_aov("2024-01", 10_000.0, 100.0, 80.0, 100.0);
        let dropped = MetricSnapshot::with_aov("2024-02", 9_900.0, 88.0, 80.0, 112.5);
        let report = build_monthly_report(&base, &dropped);
        let narrative = synthesize(Metric::Revenue, &[base.clone(), dropped], NarrativeStyle::Brief);
        assert_eq!(report.risk, "Orders dropped materially (possible demand or funnel issue).");
        assert!(narrative.risk.starts_with("Orders dropped materially"));

        let mild = MetricSnapshot::with_aov("2024-02", 9_936.0, 92.0, 80.0, 108.0);
        let report = build_monthly_report(&base, &mild);
        let narrative = synthesize(Metric::Revenue, &[base, mild], NarrativeStyle::Brief);
        assert_eq!(report.risk, NO_RISK);
        assert_eq!(narrative.risk, "No major risk signals detected.");
    }

    #[test]
    fn test_unmeasurable_base() {
        let base = MetricSnapshot::new("2024-01", 0.0, 0.0, 0.0);
        let target = MetricSnapshot::new("2024-02", 1_000.0, 10.0, 5.0);
        let report = build_monthly_report(&base, &target);

        assert_eq!(report.summary, "From 2024-01 to 2024-02, revenue changed by 1000.");
        assert_eq!(report.driver, "Primary driver unclear");
        assert_eq!(report.meta.revenue_change_pct, None);
        assert!(report.recommendation.starts_with("Collect more months"));
    }
}
