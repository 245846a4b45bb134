//! Narrative Synthesis
//!
//! Rule-based headline, risk text and recommendation for a single metric over
//! an ordered series. Style only changes the trailing detail of the headline;
//! the risk text and recommendation are the same for every style.

use decision_engine::MATERIAL_DROP_PCT;
use kpi_core::{pct_change, Metric, MetricSnapshot, Narrative, NarrativeStyle};

const NO_MAJOR_RISK: &str = "No major risk signals detected.";
const KEEP_MONITORING: &str = "Keep monitoring trends.";
const DISCOUNT_RISK: &str = "AOV dropped materially; revenue growth may be discount-driven.";
const DISCOUNT_RECOMMENDATION: &str = "Audit discounts, review product mix, and protect margin.";
const FUNNEL_RISK: &str = "Orders dropped materially; demand or funnel may be weakening.";
const FUNNEL_RECOMMENDATION: &str = "Investigate acquisition, conversion funnel, and retention actions.";
const DRIVER_RECOMMENDATION: &str =
    "Identify which lever moved most (orders vs AOV) and double-down on that driver.";
const EXECUTIVE_TAIL: &str = "Focus on the dominant driver and monitor downside risks.";

/// Fixed narrative for an empty series
pub fn no_data_narrative() -> Narrative {
    Narrative::new("No data found.", "No risk signals.", "Insert KPI data first.")
}

fn direction_word(start: f64, end: f64) -> &'static str {
    if end > start {
        "increased"
    } else if end < start {
        "decreased"
    } else {
        "was flat"
    }
}

/// `"{METRIC} {direction} from {first} to {last}"`, with the percent change
/// in parentheses when it is measurable.
pub fn headline(metric: Metric, first: &MetricSnapshot, last: &MetricSnapshot) -> String {
    let start = first.value(metric);
    let end = last.value(metric);
    let direction = direction_word(start, end);
    let name = metric.as_str().to_uppercase();

    match pct_change(Some(start), end) {
        Some(pct) => format!(
            "{} {} from {} to {} ({:.1}%).",
            name, direction, first.period_id, last.period_id, pct
        ),
        None => format!("{} {} from {} to {}.", name, direction, first.period_id, last.period_id),
    }
}

/// Risk text and recommendation. Only revenue inspects its secondary metrics:
/// an AOV drop takes precedence over an orders drop.
fn risk_and_recommendation(metric: Metric, first: &MetricSnapshot, last: &MetricSnapshot) -> (&'static str, &'static str) {
    if metric != Metric::Revenue {
        return (NO_MAJOR_RISK, KEEP_MONITORING);
    }

    let dropped = |m: Metric| {
        pct_change(Some(first.value(m)), last.value(m))
            .map(|pct| pct <= MATERIAL_DROP_PCT)
            .unwrap_or(false)
    };

    if dropped(Metric::Aov) {
        (DISCOUNT_RISK, DISCOUNT_RECOMMENDATION)
    } else if dropped(Metric::Orders) {
        (FUNNEL_RISK, FUNNEL_RECOMMENDATION)
    } else {
        (NO_MAJOR_RISK, DRIVER_RECOMMENDATION)
    }
}

/// Build the narrative for `metric` across `rows` (oldest first).
pub fn synthesize(metric: Metric, rows: &[MetricSnapshot], style: NarrativeStyle) -> Narrative {
    let (first, last) = match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return no_data_narrative(),
    };

    let headline = headline(metric, first, last);
    let narrative = match style {
        NarrativeStyle::Brief => headline,
        NarrativeStyle::Detailed => {
            let start = first.value(metric);
            let end = last.value(metric);
            format!(
                "{} Start={:.2}, End={:.2}, Change={:.2}. Data points={}.",
                headline,
                start,
                end,
                end - start,
                rows.len()
            )
        }
        NarrativeStyle::Executive => format!("{} {}", headline, EXECUTIVE_TAIL),
    };

    let (risk, recommendation) = risk_and_recommendation(metric, first, last);
    Narrative::new(narrative, risk, recommendation)
}
