use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use decision_engine::{evaluate, summarize, summarize_series, VolatilityGauge};
use insight_client::NarrativeClient;
use kpi_core::{
    AnomalyItem, DecisionSignals, DriverSummary, EnrichmentFailure, EnrichmentRequest, Metric,
    MetricSnapshot, Narrative, NarrativeEnricher, NarrativeStyle,
};
use narrative_engine::{
    build_monthly_report, no_data_narrative, synthesize, LegacyResult, MonthlyReport,
    MultiMetricPayload, ReportPayload,
};

pub mod config;
pub mod question;

pub use config::KpiConfig;
pub use question::{parse_question, AnalysisRange, Intent, ParsedQuestion};

/// Upper bound on a single enrichment call, on top of the client's own timeout
const ENRICHMENT_DEADLINE_SECS: u64 = 30;

/// Two-period comparison with the signals derived from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyAnalysis {
    pub report: MonthlyReport,
    pub driver_summary: DriverSummary,
    pub decision: DecisionSignals,
    pub anomalies: Vec<AnomalyItem>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricNarrative {
    pub metric: Metric,
    #[serde(flatten)]
    pub narrative: Narrative,
}

/// Whole-series analysis across every canonical metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiMetricAnalysis {
    pub driver_summary: DriverSummary,
    pub decision: DecisionSignals,
    pub anomalies: Vec<AnomalyItem>,
    pub narratives: Vec<MetricNarrative>,
    pub gauges: Vec<VolatilityGauge>,
    pub generated_at: DateTime<Utc>,
}

impl MultiMetricAnalysis {
    /// Formatter payload for this analysis
    pub fn to_payload(&self) -> ReportPayload {
        ReportPayload::MultiMetricFallback(MultiMetricPayload::new(&self.driver_summary, &self.decision))
    }
}

pub struct KpiOrchestrator {
    config: KpiConfig,
    enricher: Option<Arc<dyn NarrativeEnricher>>,
    enrichment_deadline: Duration,
}

impl KpiOrchestrator {
    /// Build from config. A client that cannot be constructed disables
    /// enrichment instead of failing startup.
    pub fn new(config: KpiConfig) -> Self {
        let enricher: Option<Arc<dyn NarrativeEnricher>> = match config.enrichment.clone() {
            Some(enrichment) => match NarrativeClient::new(enrichment) {
                Ok(client) => {
                    tracing::info!("Narrative enrichment enabled (model {})", client.model());
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::warn!("Narrative enrichment disabled: {}", e);
                    None
                }
            },
            None => None,
        };

        Self {
            config,
            enricher,
            enrichment_deadline: Duration::from_secs(ENRICHMENT_DEADLINE_SECS),
        }
    }

    /// Use a specific enricher regardless of config
    pub fn with_enricher(mut self, enricher: Arc<dyn NarrativeEnricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn with_enrichment_deadline(mut self, deadline: Duration) -> Self {
        self.enrichment_deadline = deadline;
        self
    }

    pub fn config(&self) -> &KpiConfig {
        &self.config
    }

    /// Compare two periods: monthly report, driver summary and signals
    pub fn analyze_monthly(&self, base: &MetricSnapshot, target: &MetricSnapshot) -> MonthlyAnalysis {
        tracing::info!("Analyzing {} -> {}", base.period_id, target.period_id);

        let report = build_monthly_report(base, target);
        let driver_summary = summarize(base, target);
        let verdict = evaluate(&driver_summary);

        MonthlyAnalysis {
            report,
            driver_summary,
            decision: verdict.decision,
            anomalies: verdict.anomalies,
            generated_at: Utc::now(),
        }
    }

    /// Analyze an ordered (oldest first) series. The driver summary compares
    /// the last two rows; narratives and gauges cover the whole series.
    pub fn analyze_series(&self, rows: &[MetricSnapshot], style: NarrativeStyle) -> MultiMetricAnalysis {
        tracing::info!("Analyzing {} periods ({} style)", rows.len(), style.as_str());

        let driver_summary = summarize_series(rows);
        let verdict = evaluate(&driver_summary);
        tracing::debug!(
            "Risk {} trend {} confidence {}",
            verdict.decision.risk_signal.as_str(),
            verdict.decision.trend_direction.as_str(),
            verdict.decision.confidence
        );

        let (narratives, gauges): (Vec<MetricNarrative>, Vec<VolatilityGauge>) = Metric::CANONICAL[..]
            .par_iter()
            .map(|&metric| {
                (
                    MetricNarrative {
                        metric,
                        narrative: synthesize(metric, rows, style),
                    },
                    VolatilityGauge::from_series(metric, rows),
                )
            })
            .unzip();

        MultiMetricAnalysis {
            driver_summary,
            decision: verdict.decision,
            anomalies: verdict.anomalies,
            narratives,
            gauges,
            generated_at: Utc::now(),
        }
    }

    async fn enrich(&self, enricher: &dyn NarrativeEnricher, request: &EnrichmentRequest) -> Result<Narrative, EnrichmentFailure> {
        match tokio::time::timeout(self.enrichment_deadline, enricher.enrich(request)).await {
            Ok(Ok(narrative)) if narrative.is_complete() => Ok(narrative),
            Ok(Ok(_)) => Err(EnrichmentFailure::InvalidResponse("incomplete narrative".to_string())),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(EnrichmentFailure::Timeout),
        }
    }

    /// The enriched narrative when an enricher is configured and succeeds,
    /// otherwise `baseline`.
    async fn enrich_or_baseline(
        &self,
        metric: Metric,
        rows: &[MetricSnapshot],
        style: NarrativeStyle,
        baseline: Narrative,
    ) -> Narrative {
        let enricher = match &self.enricher {
            Some(enricher) => enricher,
            None => return baseline,
        };

        let request = EnrichmentRequest {
            metric,
            style,
            rows: rows.to_vec(),
            baseline,
        };
        match self.enrich(enricher.as_ref(), &request).await {
            Ok(narrative) => narrative,
            Err(e) => {
                tracing::warn!(
                    "Enrichment via {} failed for {}, using rule-based narrative: {}",
                    enricher.backend_name(),
                    metric,
                    e
                );
                request.baseline
            }
        }
    }

    /// Narrative for one metric. Uses the enricher when one is configured and
    /// falls back to the rule-based narrative on any failure.
    pub async fn narrate(&self, metric: Metric, rows: &[MetricSnapshot], style: NarrativeStyle) -> Narrative {
        if rows.is_empty() {
            return no_data_narrative();
        }

        let baseline = synthesize(metric, rows, style);
        self.enrich_or_baseline(metric, rows, style, baseline).await
    }

    /// `analyze_series` with every per-metric narrative sent through the
    /// enricher concurrently. Canonical order is kept and each metric falls
    /// back to its rule-based narrative on its own.
    pub async fn analyze_series_enriched(&self, rows: &[MetricSnapshot], style: NarrativeStyle) -> MultiMetricAnalysis {
        let mut analysis = self.analyze_series(rows, style);
        if self.enricher.is_none() || rows.is_empty() {
            return analysis;
        }

        let pending = analysis.narratives.into_iter().map(|item| async move {
            let narrative = self.enrich_or_baseline(item.metric, rows, style, item.narrative).await;
            MetricNarrative {
                metric: item.metric,
                narrative,
            }
        });
        analysis.narratives = join_all(pending).await;
        analysis
    }

    /// Answer a free-text question over an ordered series with a
    /// `legacy_result` payload.
    pub async fn answer(&self, question: &str, style: Option<&str>, rows: &[MetricSnapshot]) -> ReportPayload {
        let parsed = parse_question(question, style, self.config.default_style, self.config.default_range);
        tracing::info!(
            "Question parsed: metric={} range={} intent={:?}",
            parsed.metric,
            parsed.range.as_str(),
            parsed.intent
        );

        let window = parsed.range.window(rows);
        let narrative = self.narrate(parsed.metric, window, parsed.style).await;

        ReportPayload::LegacyResult(LegacyResult {
            metric: Some(parsed.metric.as_str().to_string()),
            range: Some(parsed.range.as_str().to_string()),
            narrative: narrative.narrative,
            risk: narrative.risk,
            recommendation: narrative.recommendation,
        })
    }
}
