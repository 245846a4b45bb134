use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::KpiError;

/// KPI tracked per period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Revenue,
    Orders,
    Customers,
    Aov,
}

impl Metric {
    /// Canonical order used for ranking ties and report sections.
    pub const CANONICAL: [Metric; 4] = [Metric::Revenue, Metric::Orders, Metric::Aov, Metric::Customers];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Revenue => "revenue",
            Metric::Orders => "orders",
            Metric::Customers => "customers",
            Metric::Aov => "aov",
        }
    }

    /// Human-readable label for report lines
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Revenue => "Revenue",
            Metric::Orders => "Orders",
            Metric::Customers => "Customers",
            Metric::Aov => "AOV",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = KpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "revenue" => Ok(Metric::Revenue),
            "orders" => Ok(Metric::Orders),
            "customers" => Ok(Metric::Customers),
            "aov" => Ok(Metric::Aov),
            other => Err(KpiError::UnknownMetric(other.to_string())),
        }
    }
}

/// Aggregated KPI values for one period (e.g. a month).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Period label such as "2024-01"
    pub period_id: String,
    pub revenue: f64,
    pub orders: f64,
    pub customers: f64,
    /// Average order value, carried explicitly even though it is revenue / orders
    pub aov: f64,
}

impl MetricSnapshot {
    /// Build a snapshot deriving AOV from revenue and orders (0 when there are no orders).
    pub fn new(period_id: impl Into<String>, revenue: f64, orders: f64, customers: f64) -> Self {
        let aov = if orders != 0.0 { revenue / orders } else { 0.0 };
        Self {
            period_id: period_id.into(),
            revenue,
            orders,
            customers,
            aov,
        }
    }

    /// Build a snapshot with an explicit AOV
    pub fn with_aov(period_id: impl Into<String>, revenue: f64, orders: f64, customers: f64, aov: f64) -> Self {
        Self {
            period_id: period_id.into(),
            revenue,
            orders,
            customers,
            aov,
        }
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Revenue => self.revenue,
            Metric::Orders => self.orders,
            Metric::Customers => self.customers,
            Metric::Aov => self.aov,
        }
    }
}

/// Period-over-period change per metric, in percent units (-12.5 means -12.5%).
///
/// Every metric is always present as a key; `None` means the change could not
/// be measured (zero or missing base value).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub revenue: Option<f64>,
    pub orders: Option<f64>,
    pub customers: Option<f64>,
    pub aov: Option<f64>,
}

impl ChangeSet {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Revenue => self.revenue,
            Metric::Orders => self.orders,
            Metric::Customers => self.customers,
            Metric::Aov => self.aov,
        }
    }

    /// Copy of this set with one metric replaced
    pub fn with(mut self, metric: Metric, value: Option<f64>) -> Self {
        match metric {
            Metric::Revenue => self.revenue = value,
            Metric::Orders => self.orders = value,
            Metric::Customers => self.customers = value,
            Metric::Aov => self.aov = value,
        }
        self
    }

    /// Number of metrics with a measurable change (0-4)
    pub fn present_count(&self) -> usize {
        Metric::CANONICAL
            .iter()
            .filter(|m| self.get(**m).is_some())
            .count()
    }

    /// (metric, change) pairs in canonical order
    pub fn canonical_entries(&self) -> [(Metric, Option<f64>); 4] {
        Metric::CANONICAL.map(|m| (m, self.get(m)))
    }
}

/// Whether a driver summary could be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStatus {
    Ok,
    Error,
}

/// Metric credited with explaining a revenue move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MainDriver {
    #[serde(rename = "orders")]
    Orders,
    #[serde(rename = "aov")]
    Aov,
    /// Orders or AOV change was not measurable
    #[serde(rename = "none")]
    Undetermined,
}

impl MainDriver {
    pub fn as_str(&self) -> &'static str {
        match self {
            MainDriver::Orders => "orders",
            MainDriver::Aov => "aov",
            MainDriver::Undetermined => "none",
        }
    }

    /// The metric backing this driver, if any
    pub fn metric(&self) -> Option<Metric> {
        match self {
            MainDriver::Orders => Some(Metric::Orders),
            MainDriver::Aov => Some(Metric::Aov),
            MainDriver::Undetermined => None,
        }
    }
}

/// Changes between two periods plus the attributed driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSummary {
    pub status: SummaryStatus,
    pub changes_pct: ChangeSet,
    pub main_driver: MainDriver,
    #[serde(default)]
    pub executive_summary: String,
}

impl DriverSummary {
    /// Summary for a request that did not have enough data to compare periods
    pub fn insufficient(reason: impl Into<String>) -> Self {
        Self {
            status: SummaryStatus::Error,
            changes_pct: ChangeSet::default(),
            main_driver: MainDriver::Undetermined,
            executive_summary: reason.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == SummaryStatus::Ok
    }

    /// Change of the attributed driver's own metric
    pub fn driver_change(&self) -> Option<f64> {
        self.main_driver.metric().and_then(|m| self.changes_pct.get(m))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskSignal {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskSignal::Low => "LOW",
            RiskSignal::Medium => "MEDIUM",
            RiskSignal::High => "HIGH",
            RiskSignal::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
    Unknown,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Up => "UP",
            TrendDirection::Down => "DOWN",
            TrendDirection::Flat => "FLAT",
            TrendDirection::Unknown => "UNKNOWN",
        }
    }
}

/// Decision-grade verdict derived from a driver summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSignals {
    pub risk_signal: RiskSignal,
    pub trend_direction: TrendDirection,
    /// Data-coverage proxy in [0, 1], not a statistical interval
    pub confidence: f64,
    /// Heuristic severity index in [0, 100]
    pub risk_score: u8,
    pub next_actions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }
}

/// A metric that moved noticeably, with its change in percent units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyItem {
    pub metric: Metric,
    pub pct_change: f64,
    pub severity: Severity,
}

/// How much numeric detail a narrative headline carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativeStyle {
    Brief,
    #[default]
    Executive,
    Detailed,
}

impl NarrativeStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            NarrativeStyle::Brief => "brief",
            NarrativeStyle::Executive => "executive",
            NarrativeStyle::Detailed => "detailed",
        }
    }
}

impl FromStr for NarrativeStyle {
    type Err = KpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brief" => Ok(NarrativeStyle::Brief),
            "executive" => Ok(NarrativeStyle::Executive),
            "detailed" => Ok(NarrativeStyle::Detailed),
            other => Err(KpiError::UnknownStyle(other.to_string())),
        }
    }
}

/// Narrative triple. Rule-based and enriched sources both produce this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub narrative: String,
    pub risk: String,
    pub recommendation: String,
}

impl Narrative {
    pub fn new(narrative: impl Into<String>, risk: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Self {
            narrative: narrative.into(),
            risk: risk.into(),
            recommendation: recommendation.into(),
        }
    }

    /// True when every field carries text
    pub fn is_complete(&self) -> bool {
        !self.narrative.trim().is_empty()
            && !self.risk.trim().is_empty()
            && !self.recommendation.trim().is_empty()
    }
}

/// Input handed to a narrative enricher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentRequest {
    pub metric: Metric,
    pub style: NarrativeStyle,
    pub rows: Vec<MetricSnapshot>,
    /// Rule-based narrative for the same rows
    pub baseline: Narrative,
}
