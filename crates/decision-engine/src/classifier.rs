//! Trend & Risk Classification
//!
//! Maps percent changes to a categorical trend, a categorical risk signal and
//! a bounded 0-100 risk score. All thresholds are in percent units.

use kpi_core::{DecisionSignals, DriverSummary, RiskSignal, TrendDirection};

use crate::actions::plan_next_actions;
use crate::confidence::estimate_confidence;

/// Revenue moves inside ±2% are noise, not a trend
pub const TREND_BAND_PCT: f64 = 2.0;
/// Revenue drop that is HIGH risk on its own
pub const SEVERE_REVENUE_DROP_PCT: f64 = -15.0;
/// Revenue drop that is at least MEDIUM risk
pub const REVENUE_DROP_PCT: f64 = -8.0;
/// Orders or AOV drop that counts as material: escalates risk and raises
/// narrative and report flags
pub const MATERIAL_DROP_PCT: f64 = -10.0;

/// Points of risk score per percent of revenue move
const SCORE_PER_PCT: f64 = 4.0;
const MAX_SCORE: u8 = 100;

/// Confidence reported when there is nothing to compare
pub const INSUFFICIENT_CONFIDENCE: f64 = 0.2;
pub const INSUFFICIENT_ACTION: &str = "Insert at least 2 months of KPI data and rerun analysis.";

pub fn classify_trend(revenue: Option<f64>) -> TrendDirection {
    match revenue {
        None => TrendDirection::Unknown,
        Some(r) if r <= -TREND_BAND_PCT => TrendDirection::Down,
        Some(r) if r >= TREND_BAND_PCT => TrendDirection::Up,
        Some(_) => TrendDirection::Flat,
    }
}

/// Categorical risk; the first matching rule wins.
///
/// Without a revenue change only the driver rule can raise risk above LOW.
pub fn classify_risk(revenue: Option<f64>, driver_change: Option<f64>) -> RiskSignal {
    let driver_dropped = driver_change.map(|d| d <= MATERIAL_DROP_PCT).unwrap_or(false);

    match revenue {
        Some(r) if r <= SEVERE_REVENUE_DROP_PCT => RiskSignal::High,
        Some(r) if r <= REVENUE_DROP_PCT && driver_dropped => RiskSignal::High,
        Some(r) if r <= REVENUE_DROP_PCT => RiskSignal::Medium,
        _ if driver_dropped => RiskSignal::Medium,
        _ => RiskSignal::Low,
    }
}

/// Minimum score for a categorical risk
pub fn risk_floor(signal: RiskSignal) -> u8 {
    match signal {
        RiskSignal::High => 80,
        RiskSignal::Medium => 45,
        RiskSignal::Low | RiskSignal::Unknown => 10,
    }
}

/// Categorical floor raised by revenue magnitude, capped at 100.
///
/// The boost never lowers the floor; without a revenue change the score is
/// the floor.
pub fn risk_score(signal: RiskSignal, revenue: Option<f64>) -> u8 {
    let floor = risk_floor(signal);
    match revenue {
        Some(r) => {
            let boost = (r.abs() * SCORE_PER_PCT).round().min(MAX_SCORE as f64) as u8;
            floor.max(boost).min(MAX_SCORE)
        }
        None => floor,
    }
}

/// Fixed verdict for requests without a usable driver summary
pub fn insufficient_signals() -> DecisionSignals {
    DecisionSignals {
        risk_signal: RiskSignal::Unknown,
        trend_direction: TrendDirection::Unknown,
        confidence: INSUFFICIENT_CONFIDENCE,
        risk_score: risk_floor(RiskSignal::Unknown),
        next_actions: vec![INSUFFICIENT_ACTION.to_string()],
    }
}

/// Convert a driver summary into decision-grade signals.
pub fn build_decision_signals(summary: &DriverSummary) -> DecisionSignals {
    if !summary.is_ok() {
        tracing::debug!("Driver summary not ok, returning insufficient-data signals");
        return insufficient_signals();
    }

    let changes = &summary.changes_pct;
    let risk_signal = classify_risk(changes.revenue, summary.driver_change());
    let trend_direction = classify_trend(changes.revenue);
    let risk_score = risk_score(risk_signal, changes.revenue);
    let confidence = estimate_confidence(changes);
    let next_actions = plan_next_actions(risk_signal, summary.main_driver, changes);

    tracing::debug!(
        "Decision signals: risk={} trend={} score={} confidence={:.2} driver={}",
        risk_signal.as_str(),
        trend_direction.as_str(),
        risk_score,
        confidence,
        summary.main_driver.as_str()
    );

    DecisionSignals {
        risk_signal,
        trend_direction,
        confidence,
        risk_score,
        next_actions,
    }
}
