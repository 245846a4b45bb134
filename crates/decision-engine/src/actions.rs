//! Next-action planning for decision signals.

use kpi_core::{ChangeSet, MainDriver, RiskSignal};

pub const MAX_ACTIONS: usize = 6;
/// Customer drop (percent) that warrants a retention review
pub const CUSTOMER_DROP_PCT: f64 = -8.0;

const HIGH_RISK_ACTIONS: [&str; 2] = [
    "Investigate top contributors immediately (segment, channel, region).",
    "Run anomaly checks on ingestion/ETL and KPI definitions.",
];
const ORDERS_ACTIONS: [&str; 2] = [
    "Break down orders by acquisition channel and customer cohort.",
    "Check cancellation rate, stockouts, and traffic-to-order conversion.",
];
const AOV_ACTIONS: [&str; 2] = [
    "Break down AOV by product mix and discount/price bands.",
    "Check return/refund impact and pricing/promotions changes.",
];
const RETENTION_ACTION: &str = "Analyze churn/retention: new vs returning customers, reactivation rate.";
const MONITOR_ACTION: &str = "Monitor KPIs and set alert thresholds for significant deviations.";

/// Ordered follow-ups: urgent checks first, then driver breakdowns, then retention.
pub fn plan_next_actions(risk: RiskSignal, driver: MainDriver, changes: &ChangeSet) -> Vec<String> {
    let mut actions: Vec<&str> = Vec::new();

    if risk == RiskSignal::High {
        actions.extend(HIGH_RISK_ACTIONS);
    }
    match driver {
        MainDriver::Orders => actions.extend(ORDERS_ACTIONS),
        MainDriver::Aov => actions.extend(AOV_ACTIONS),
        MainDriver::Undetermined => {}
    }
    if changes.customers.map(|c| c <= CUSTOMER_DROP_PCT).unwrap_or(false) {
        actions.push(RETENTION_ACTION);
    }
    if actions.is_empty() {
        actions.push(MONITOR_ACTION);
    }

    let mut planned: Vec<String> = Vec::with_capacity(actions.len());
    for action in actions {
        if !planned.iter().any(|a| a == action) {
            planned.push(action.to_string());
        }
    }
    planned.truncate(MAX_ACTIONS);
    planned
}
