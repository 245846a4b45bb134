//! Driver Attribution
//!
//! Credits a revenue move to either order volume or average order value.
//! Since revenue ≈ orders × AOV, the larger relative mover is treated as the
//! dominant factor. This is a heuristic, not an exact decomposition: the two
//! changes interact multiplicatively and customers are ignored.

use kpi_core::{ChangeSet, DriverSummary, MainDriver, MetricSnapshot, SummaryStatus};

/// Pick the driver with the larger absolute change. Ties go to orders.
///
/// Returns `Undetermined` when either change is unmeasurable.
pub fn attribute_driver(changes: &ChangeSet) -> MainDriver {
    match (changes.orders, changes.aov) {
        (Some(orders), Some(aov)) => {
            if orders.abs() >= aov.abs() {
                MainDriver::Orders
            } else {
                MainDriver::Aov
            }
        }
        _ => MainDriver::Undetermined,
    }
}

/// One-line description of the revenue move between two periods.
///
/// The absolute delta is always shown; the percent only when measurable.
pub fn revenue_summary(base: &MetricSnapshot, target: &MetricSnapshot, changes: &ChangeSet) -> String {
    let delta = target.revenue - base.revenue;
    match changes.revenue {
        Some(pct) => format!(
            "From {} to {}, revenue changed by {:.0} ({:.1}%).",
            base.period_id, target.period_id, delta, pct
        ),
        None => format!(
            "From {} to {}, revenue changed by {:.0}.",
            base.period_id, target.period_id, delta
        ),
    }
}

/// Compare two periods and attribute the revenue move.
pub fn summarize(base: &MetricSnapshot, target: &MetricSnapshot) -> DriverSummary {
    let changes = ChangeSet::between(base, target);
    let main_driver = attribute_driver(&changes);

    let mut executive_summary = revenue_summary(base, target, &changes);
    if let Some(metric) = main_driver.metric() {
        if let Some(pct) = changes.get(metric) {
            executive_summary.push_str(&format!(" {} moved most ({:.1}%).", metric.label(), pct));
        }
    }

    DriverSummary {
        status: SummaryStatus::Ok,
        changes_pct: changes,
        main_driver,
        executive_summary,
    }
}

/// Summarize the last two rows of an ordered (oldest first) series.
pub fn summarize_series(rows: &[MetricSnapshot]) -> DriverSummary {
    match rows {
        [.., base, target] => summarize(base, target),
        _ => DriverSummary::insufficient(format!(
            "Need at least 2 periods of KPI data, found {}.",
            rows.len()
        )),
    }
}
