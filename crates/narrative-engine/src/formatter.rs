//! Report Formatting
//!
//! Renders analysis payloads into fixed, human-readable text layouts. The
//! layout is picked by the payload's explicit `mode`, never by probing which
//! fields happen to be present. Rendering never fails: anything missing or
//! malformed degrades to `n/a`, an omitted line, or the unknown-mode
//! diagnostic.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use kpi_core::{
    ChangeSet, DecisionSignals, DriverSummary, MainDriver, Metric, RiskSignal, SummaryStatus,
    TrendDirection,
};

pub const MAX_REPORT_ACTIONS: usize = 5;
pub const UNAVAILABLE_REPORT: &str = "Executive report unavailable due to insufficient KPI data.";

const MODE_MULTI_METRIC: &str = "multi_metric_fallback";
const MODE_FALLBACK_LEGACY: &str = "fallback_legacy";
const MODE_LEGACY_RESULT: &str = "legacy_result";
const MODE_UNKNOWN: &str = "unknown";

/// Driver summary as received by the formatter. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverBlock {
    #[serde(default)]
    pub status: Option<SummaryStatus>,
    #[serde(default)]
    pub changes_pct: ChangeSet,
    #[serde(default)]
    pub main_driver: Option<MainDriver>,
    #[serde(default)]
    pub executive_summary: String,
}

impl DriverBlock {
    pub fn is_ok(&self) -> bool {
        self.status == Some(SummaryStatus::Ok)
    }

    /// Field-by-field decode; a field that does not decode is left unset.
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let changes = obj.get("changes_pct").and_then(Value::as_object);
        let changes_pct = Metric::CANONICAL.iter().fold(ChangeSet::default(), |set, &metric| {
            let value = changes.and_then(|c| c.get(metric.as_str())).and_then(Value::as_f64);
            set.with(metric, value)
        });

        Some(Self {
            status: decode(obj, "status"),
            changes_pct,
            main_driver: decode(obj, "main_driver"),
            executive_summary: text_field(obj.get("executive_summary")),
        })
    }
}

impl From<&DriverSummary> for DriverBlock {
    fn from(summary: &DriverSummary) -> Self {
        Self {
            status: Some(summary.status),
            changes_pct: summary.changes_pct,
            main_driver: Some(summary.main_driver),
            executive_summary: summary.executive_summary.clone(),
        }
    }
}

/// Decision signals as received by the formatter. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalsBlock {
    #[serde(default)]
    pub risk_signal: Option<RiskSignal>,
    #[serde(default)]
    pub trend_direction: Option<TrendDirection>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub next_actions: Vec<String>,
}

impl SignalsBlock {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let next_actions = obj
            .get("next_actions")
            .and_then(Value::as_array)
            .map(|actions| {
                actions
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            risk_signal: decode(obj, "risk_signal"),
            trend_direction: decode(obj, "trend_direction"),
            confidence: obj.get("confidence").and_then(Value::as_f64),
            next_actions,
        })
    }
}

impl From<&DecisionSignals> for SignalsBlock {
    fn from(signals: &DecisionSignals) -> Self {
        Self {
            risk_signal: Some(signals.risk_signal),
            trend_direction: Some(signals.trend_direction),
            confidence: Some(signals.confidence),
            next_actions: signals.next_actions.clone(),
        }
    }
}

/// Multi-metric analysis: driver summary plus the signals derived from it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiMetricPayload {
    #[serde(default)]
    pub driver_summary: Option<DriverBlock>,
    #[serde(default)]
    pub decision: Option<SignalsBlock>,
}

impl MultiMetricPayload {
    pub fn new(summary: &DriverSummary, decision: &DecisionSignals) -> Self {
        Self {
            driver_summary: Some(summary.into()),
            decision: Some(decision.into()),
        }
    }
}

/// Single-metric answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyResult {
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub narrative: String,
    #[serde(default)]
    pub risk: String,
    #[serde(default)]
    pub recommendation: String,
}

/// Input to the formatter, discriminated by `mode`.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportPayload {
    MultiMetricFallback(MultiMetricPayload),
    /// Wrapper around another payload, rendered with the same formatter
    FallbackLegacy(Box<ReportPayload>),
    LegacyResult(LegacyResult),
    /// Unrecognised mode; keeps the top-level field names, in payload order,
    /// for diagnostics
    Unknown { mode: String, keys: Vec<String> },
}

impl ReportPayload {
    pub fn mode(&self) -> &str {
        match self {
            ReportPayload::MultiMetricFallback(_) => MODE_MULTI_METRIC,
            ReportPayload::FallbackLegacy(_) => MODE_FALLBACK_LEGACY,
            ReportPayload::LegacyResult(_) => MODE_LEGACY_RESULT,
            ReportPayload::Unknown { mode, .. } => mode,
        }
    }

    /// Decode a loosely shaped JSON payload without failing.
    ///
    /// The `mode` field selects the variant. Each field is decoded on its own
    /// and one that does not decode is treated as missing; a non-object value
    /// or an unrecognised mode becomes `Unknown`.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return ReportPayload::Unknown {
                mode: MODE_UNKNOWN.to_string(),
                keys: Vec::new(),
            };
        };

        let mode = obj.get("mode").and_then(Value::as_str).unwrap_or(MODE_UNKNOWN);
        let field = |name: &str| obj.get(name).cloned().unwrap_or(Value::Null);

        match mode {
            MODE_MULTI_METRIC => ReportPayload::MultiMetricFallback(MultiMetricPayload {
                driver_summary: DriverBlock::from_value(&field("driver_summary")),
                decision: SignalsBlock::from_value(&field("decision")),
            }),
            MODE_FALLBACK_LEGACY => {
                ReportPayload::FallbackLegacy(Box::new(ReportPayload::from_value(&field("legacy"))))
            }
            MODE_LEGACY_RESULT => ReportPayload::LegacyResult(LegacyResult {
                metric: obj.get("metric").and_then(Value::as_str).map(str::to_string),
                range: obj.get("range").and_then(Value::as_str).map(str::to_string),
                narrative: text_field(obj.get("narrative")),
                risk: text_field(obj.get("risk")),
                recommendation: text_field(obj.get("recommendation")),
            }),
            other => {
                tracing::debug!("Unrecognised report mode: {}", other);
                ReportPayload::Unknown {
                    mode: other.to_string(),
                    keys: obj.keys().cloned().collect(),
                }
            }
        }
    }
}

fn decode<T: DeserializeOwned>(obj: &Map<String, Value>, name: &str) -> Option<T> {
    obj.get(name).and_then(|v| T::deserialize(v).ok())
}

fn text_field(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or_default().to_string()
}

fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v),
        None => "n/a".to_string(),
    }
}

fn render_multi_metric(payload: &MultiMetricPayload) -> String {
    let driver = match &payload.driver_summary {
        Some(driver) if driver.is_ok() => driver,
        _ => return UNAVAILABLE_REPORT.to_string(),
    };

    let mut lines: Vec<String> = vec![
        "EXECUTIVE KPI SUMMARY".to_string(),
        format!("Mode: {}", MODE_MULTI_METRIC),
    ];
    if !driver.executive_summary.is_empty() {
        lines.push(format!("Executive Summary: {}", driver.executive_summary));
    }
    let main_driver = driver.main_driver.map(|d| d.as_str()).unwrap_or(MODE_UNKNOWN);
    lines.push(format!("Main Driver: {}", main_driver));

    lines.push("MoM Changes:".to_string());
    for metric in Metric::CANONICAL {
        lines.push(format!("- {}: {}", metric.label(), fmt_pct(driver.changes_pct.get(metric))));
    }

    let decision = payload.decision.as_ref();
    let risk = decision.and_then(|d| d.risk_signal).unwrap_or(RiskSignal::Unknown);
    let trend = decision.and_then(|d| d.trend_direction).unwrap_or(TrendDirection::Unknown);
    lines.push("Decision Signals:".to_string());
    lines.push(format!("- Risk: {}", risk.as_str()));
    lines.push(format!("- Trend: {}", trend.as_str()));
    if let Some(confidence) = decision.and_then(|d| d.confidence) {
        lines.push(format!("- Confidence: {}", confidence));
    }

    let actions = decision.map(|d| d.next_actions.as_slice()).unwrap_or_default();
    if !actions.is_empty() {
        lines.push("Next Actions:".to_string());
        for action in actions.iter().take(MAX_REPORT_ACTIONS) {
            lines.push(format!("- {}", action));
        }
    }

    lines.join("\n")
}

fn render_legacy(result: &LegacyResult) -> String {
    let mut lines = vec![
        "KPI ANSWER (LEGACY)".to_string(),
        format!("Metric: {}", result.metric.as_deref().unwrap_or(MODE_UNKNOWN)),
        format!("Range: {}", result.range.as_deref().unwrap_or(MODE_UNKNOWN)),
    ];
    if !result.narrative.is_empty() {
        lines.push(format!("Narrative: {}", result.narrative));
    }
    if !result.risk.is_empty() {
        lines.push(format!("Risk: {}", result.risk));
    }
    if !result.recommendation.is_empty() {
        lines.push(format!("Recommendation: {}", result.recommendation));
    }
    lines.join("\n")
}

/// Render a payload into report text.
pub fn render(payload: &ReportPayload) -> String {
    match payload {
        ReportPayload::MultiMetricFallback(multi) => render_multi_metric(multi),
        ReportPayload::FallbackLegacy(inner) => render(inner),
        ReportPayload::LegacyResult(result) => render_legacy(result),
        ReportPayload::Unknown { mode, keys } => {
            format!("Mode: {}\nRaw response keys: [{}]", mode, keys.join(", "))
        }
    }
}

/// Decode and render a JSON payload in one step.
pub fn render_value(value: &Value) -> String {
    render(&ReportPayload::from_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn driver() -> DriverSummary {
        DriverSummary {
            status: SummaryStatus::Ok,
            changes_pct: ChangeSet {
                revenue: Some(-20.0),
                orders: Some(-5.0),
                customers: None,
                aov: Some(-15.789),
            },
            main_driver: MainDriver::Aov,
            executive_summary: "Revenue fell.".to_string(),
        }
    }

    fn decision(actions: usize) -> DecisionSignals {
        DecisionSignals {
            risk_signal: RiskSignal::High,
            trend_direction: TrendDirection::Down,
            confidence: 0.85,
            risk_score: 80,
            next_actions: (1..=actions).map(|i| format!("Action {}", i)).collect(),
        }
    }

    #[test]
    fn test_multi_metric_layout() {
        let payload = ReportPayload::MultiMetricFallback(MultiMetricPayload::new(&driver(), &decision(6)));
        let expected = "EXECUTIVE KPI SUMMARY\n\
            Mode: multi_metric_fallback\n\
            Executive Summary: Revenue fell.\n\
            Main Driver: aov\n\
            MoM Changes:\n\
            - Revenue: -20.0%\n\
            - Orders: -5.0%\n\
            - AOV: -15.8%\n\
            - Customers: n/a\n\
            Decision Signals:\n\
            - Risk: HIGH\n\
            - Trend: DOWN\n\
            - Confidence: 0.85\n\
            Next Actions:\n\
            - Action 1\n\
            - Action 2\n\
            - Action 3\n\
            - Action 4\n\
            - Action 5";
        assert_eq!(render(&payload), expected);
    }

    #[test]
    fn test_multi_metric_without_decision() {
        let payload = ReportPayload::MultiMetricFallback(MultiMetricPayload {
            driver_summary: Some(DriverBlock::from(&driver())),
            decision: None,
        });
        let text = render(&payload);
        assert!(text.contains("- Risk: UNKNOWN"));
        assert!(!text.contains("Confidence"));
        assert!(!text.contains("Next Actions"));
    }

    #[test]
    fn test_unavailable_when_driver_not_ok() {
        let payload = ReportPayload::MultiMetricFallback(MultiMetricPayload::new(
            &DriverSummary::insufficient("one row"),
            &decision(1),
        ));
        assert_eq!(render(&payload), UNAVAILABLE_REPORT);
        assert_eq!(render(&ReportPayload::MultiMetricFallback(MultiMetricPayload::default())), UNAVAILABLE_REPORT);
    }

    #[test]
    fn test_legacy_omits_empty_lines() {
        let payload = ReportPayload::LegacyResult(LegacyResult {
            metric: Some("revenue".to_string()),
            range: None,
            narrative: "REVENUE increased.".to_string(),
            risk: String::new(),
            recommendation: "Keep monitoring trends.".to_string(),
        });
        assert_eq!(
            render(&payload),
            "KPI ANSWER (LEGACY)\nMetric: revenue\nRange: unknown\nNarrative: REVENUE increased.\nRecommendation: Keep monitoring trends."
        );
    }

    #[test]
    fn test_fallback_legacy_recurses() {
        let value = json!({
            "mode": "fallback_legacy",
            "legacy": {
                "mode": "legacy_result",
                "metric": "orders",
                "range": "last_3_months",
                "narrative": "ORDERS was flat.",
            }
        });
        assert_eq!(
            render_value(&value),
            "KPI ANSWER (LEGACY)\nMetric: orders\nRange: last_3_months\nNarrative: ORDERS was flat."
        );
    }

    #[test]
    fn test_fallback_legacy_without_inner() {
        assert_eq!(
            render_value(&json!({"mode": "fallback_legacy"})),
            "Mode: unknown\nRaw response keys: []"
        );
    }

    #[test]
    fn test_unknown_mode_lists_keys() {
        let value = json!({"mode": "agent", "question": "why?", "plan": {}});
        assert_eq!(render_value(&value), "Mode: agent\nRaw response keys: [mode, question, plan]");
    }

    #[test]
    fn test_never_fails_on_odd_input() {
        assert_eq!(render_value(&json!({})), "Mode: unknown\nRaw response keys: []");
        assert_eq!(render_value(&Value::Null), "Mode: unknown\nRaw response keys: []");
        assert_eq!(render_value(&json!([1, 2, 3])), "Mode: unknown\nRaw response keys: []");
        assert_eq!(
            render_value(&json!({"mode": 42, "x": 1})),
            "Mode: unknown\nRaw response keys: [mode, x]"
        );
        assert_eq!(
            render_value(&json!({"mode": "multi_metric_fallback", "driver_summary": "broken"})),
            UNAVAILABLE_REPORT
        );
    }

    #[test]
    fn test_decodes_serialized_analysis() {
        let value = json!({
            "mode": "multi_metric_fallback",
            "driver_summary": serde_json::to_value(driver()).unwrap(),
            "decision": serde_json::to_value(decision(2)).unwrap(),
        });
        let expected = ReportPayload::MultiMetricFallback(MultiMetricPayload::new(&driver(), &decision(2)));
        assert_eq!(ReportPayload::from_value(&value), expected);
    }

    #[test]
    fn test_partial_decision_keeps_present_signals() {
        let value = json!({
            "mode": "multi_metric_fallback",
            "driver_summary": serde_json::to_value(driver()).unwrap(),
            "decision": {"risk_signal": "MEDIUM", "trend_direction": "DOWN", "confidence": 0.95},
        });
        let text = render_value(&value);
        assert!(text.contains("Main Driver: aov"));
        assert!(text.contains("- Customers: n/a"));
        assert!(text.contains("- Risk: MEDIUM"));
        assert!(text.contains("- Trend: DOWN"));
        assert!(text.contains("- Confidence: 0.95"));
        assert!(!text.contains("Next Actions"));

        let text = render_value(&json!({
            "mode": "multi_metric_fallback",
            "driver_summary": serde_json::to_value(driver()).unwrap(),
            "decision": {"risk_signal": "HIGH", "trend_direction": 7, "next_actions": ["Act", 3]},
        }));
        assert!(text.contains("- Risk: HIGH"));
        assert!(text.contains("- Trend: UNKNOWN"));
        assert!(!text.contains("Confidence"));
        assert!(text.ends_with("Next Actions:\n- Act"));
    }

    #[test]
    fn test_partial_driver_summary_still_renders() {
        let value = json!({
            "mode": "multi_metric_fallback",
            "driver_summary": {"status": "ok", "changes_pct": {"revenue": -5.0, "orders": "bad"}},
            "decision": {"risk_signal": "HIGH", "trend_direction": "DOWN", "confidence": 0.75},
        });
        let expected = "EXECUTIVE KPI SUMMARY\n\
            Mode: multi_metric_fallback\n\
            Main Driver: unknown\n\
            MoM Changes:\n\
            - Revenue: -5.0%\n\
            - Orders: n/a\n\
            - AOV: n/a\n\
            - Customers: n/a\n\
            Decision Signals:\n\
            - Risk: HIGH\n\
            - Trend: DOWN\n\
            - Confidence: 0.75";
        assert_eq!(render_value(&value), expected);
    }

    #[test]
    fn test_unavailable_only_when_status_not_ok() {
        let error = json!({"mode": "multi_metric_fallback", "driver_summary": {"status": "error"}});
        assert_eq!(render_value(&error), UNAVAILABLE_REPORT);
        let missing = json!({"mode": "multi_metric_fallback", "driver_summary": {"main_driver": "orders"}});
        assert_eq!(render_value(&missing), UNAVAILABLE_REPORT);
    }
}
