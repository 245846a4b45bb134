//! Keyword-based question parsing.
//!
//! Maps a free-text question to the metric, lookback window, style and intent
//! used by the single-metric path. Unrecognised input falls back to defaults
//! rather than failing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

use kpi_core::{Metric, MetricSnapshot, NarrativeStyle};

static LAST_N_MONTHS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"last\s+(\d+)\s+months?").ok());

const KEYWORDS: [&str; 10] = [
    "performance",
    "revenue",
    "orders",
    "customers",
    "aov",
    "drop",
    "trend",
    "compare",
    "ytd",
    "quarter",
];

/// Number of trailing periods to analyse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisRange {
    #[serde(rename = "last_2_months")]
    Last2Months,
    #[default]
    #[serde(rename = "last_3_months")]
    Last3Months,
    #[serde(rename = "last_6_months")]
    Last6Months,
    Ytd,
}

impl AnalysisRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisRange::Last2Months => "last_2_months",
            AnalysisRange::Last3Months => "last_3_months",
            AnalysisRange::Last6Months => "last_6_months",
            AnalysisRange::Ytd => "ytd",
        }
    }

    /// Trailing period count, `None` for the whole series
    pub fn periods(&self) -> Option<usize> {
        match self {
            AnalysisRange::Last2Months => Some(2),
            AnalysisRange::Last3Months => Some(3),
            AnalysisRange::Last6Months => Some(6),
            AnalysisRange::Ytd => None,
        }
    }

    /// The trailing slice of an ordered (oldest first) series covered by this range
    pub fn window<'a>(&self, rows: &'a [MetricSnapshot]) -> &'a [MetricSnapshot] {
        match self.periods() {
            Some(n) if rows.len() > n => &rows[rows.len() - n..],
            _ => rows,
        }
    }

    fn from_month_count(n: u32) -> Self {
        match n {
            0..=2 => AnalysisRange::Last2Months,
            3 => AnalysisRange::Last3Months,
            _ => AnalysisRange::Last6Months,
        }
    }
}

impl FromStr for AnalysisRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last_2_months" => Ok(AnalysisRange::Last2Months),
            "last_3_months" => Ok(AnalysisRange::Last3Months),
            "last_6_months" => Ok(AnalysisRange::Last6Months),
            "ytd" => Ok(AnalysisRange::Ytd),
            other => Err(format!("unknown range: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Why,
    Trend,
    Compare,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuestion {
    pub metric: Metric,
    pub range: AnalysisRange,
    pub style: NarrativeStyle,
    pub intent: Intent,
    pub keywords: Vec<String>,
}

fn detect_metric(q: &str) -> Metric {
    if q.contains("revenue") || q.contains("sales") {
        Metric::Revenue
    } else if q.contains("order") {
        Metric::Orders
    } else if q.contains("customer") {
        Metric::Customers
    } else if q.contains("aov") || q.contains("average order value") {
        Metric::Aov
    } else {
        Metric::Revenue
    }
}

fn detect_range(q: &str, default: AnalysisRange) -> AnalysisRange {
    let explicit = LAST_N_MONTHS
        .as_ref()
        .and_then(|re| re.captures(q))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok());
    if let Some(n) = explicit {
        return AnalysisRange::from_month_count(n);
    }

    if q.contains("ytd") || q.contains("year to date") || q.contains("this year") {
        AnalysisRange::Ytd
    } else if q.contains("quarter") || q.contains("recent") {
        AnalysisRange::Last3Months
    } else if q.contains("past 6 months") {
        AnalysisRange::Last6Months
    } else {
        default
    }
}

fn detect_intent(q: &str) -> Intent {
    let has_any = |words: &[&str]| words.iter().any(|w| q.contains(w));
    if has_any(&["why", "cause", "reason", "drop", "decline"]) {
        Intent::Why
    } else if has_any(&["trend", "over time", "time series", "last", "past"]) {
        Intent::Trend
    } else if has_any(&["compare", "vs", "versus", "difference"]) {
        Intent::Compare
    } else {
        Intent::Unknown
    }
}

/// Parse a question. An unrecognised `style` falls back to `default_style`.
pub fn parse_question(
    question: &str,
    style: Option<&str>,
    default_style: NarrativeStyle,
    default_range: AnalysisRange,
) -> ParsedQuestion {
    let q = question.to_lowercase();
    let style = style
        .and_then(|s| s.parse::<NarrativeStyle>().ok())
        .unwrap_or(default_style);

    ParsedQuestion {
        metric: detect_metric(&q),
        range: detect_range(&q, default_range),
        style,
        intent: detect_intent(&q),
        keywords: KEYWORDS
            .iter()
            .filter(|k| q.contains(*k))
            .map(|k| k.to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(q: &str) -> ParsedQuestion {
        parse_question(q, None, NarrativeStyle::Executive, AnalysisRange::Last3Months)
    }

    #[test]
    fn test_detects_metric() {
        assert_eq!(parse("How are sales doing?").metric, Metric::Revenue);
        assert_eq!(parse("Orders last month").metric, Metric::Orders);
        assert_eq!(parse("new customers").metric, Metric::Customers);
        assert_eq!(parse("What is our average order value?").metric, Metric::Orders);
        assert_eq!(parse("AOV please").metric, Metric::Aov);
        assert_eq!(parse("anything").metric, Metric::Revenue);
    }

    #[test]
    fn test_detects_range() {
        assert_eq!(parse("revenue over the last 2 months").range, AnalysisRange::Last2Months);
        assert_eq!(parse("revenue last 1 month").range, AnalysisRange::Last2Months);
        assert_eq!(parse("revenue last 3 months").range, AnalysisRange::Last3Months);
        assert_eq!(parse("revenue last 12 months").range, AnalysisRange::Last6Months);
        assert_eq!(parse("revenue year to date").range, AnalysisRange::Ytd);
        assert_eq!(parse("revenue this quarter").range, AnalysisRange::Last3Months);
        assert_eq!(parse("revenue").range, AnalysisRange::Last3Months);
    }

    #[test]
    fn test_detects_intent_and_keywords() {
        let parsed = parse("Why did revenue drop vs last quarter?");
        assert_eq!(parsed.intent, Intent::Why);
        assert_eq!(parsed.keywords, vec!["revenue", "drop", "quarter"]);
        assert_eq!(parse("show the orders trend").intent, Intent::Trend);
        assert_eq!(parse("compare aov").intent, Intent::Compare);
        assert_eq!(parse("hello").intent, Intent::Unknown);
    }

    #[test]
    fn test_style_override() {
        let parsed = parse_question("revenue", Some("Detailed"), NarrativeStyle::Executive, AnalysisRange::Ytd);
        assert_eq!(parsed.style, NarrativeStyle::Detailed);
        assert_eq!(parsed.range, AnalysisRange::Ytd);
        let parsed = parse_question("revenue", Some("basic"), NarrativeStyle::Brief, AnalysisRange::Ytd);
        assert_eq!(parsed.style, NarrativeStyle::Brief);
    }

    #[test]
    fn test_window() {
        let rows: Vec<MetricSnapshot> = (1..=8)
            .map(|m| MetricSnapshot::new(format!("2024-{:02}", m), 100.0 * m as f64, 10.0, 10.0))
            .collect();
        assert_eq!(AnalysisRange::Last2Months.window(&rows).len(), 2);
        assert_eq!(AnalysisRange::Last6Months.window(&rows)[0].period_id, "2024-03");
        assert_eq!(AnalysisRange::Ytd.window(&rows).len(), 8);
        assert_eq!(AnalysisRange::Last3Months.window(&rows[..1]).len(), 1);
    }

    #[test]
    fn test_range_roundtrips_through_str() {
        for range in [
            AnalysisRange::Last2Months,
            AnalysisRange::Last3Months,
            AnalysisRange::Last6Months,
            AnalysisRange::Ytd,
        ] {
            assert_eq!(range.as_str().parse::<AnalysisRange>().unwrap(), range);
        }
    }
}
