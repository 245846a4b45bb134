use anyhow::{anyhow, Result};
use std::env;

use insight_client::EnrichmentConfig;
use kpi_core::NarrativeStyle;

use crate::question::AnalysisRange;

#[derive(Debug, Clone)]
pub struct KpiConfig {
    pub default_style: NarrativeStyle, // executive
    pub default_range: AnalysisRange,  // last_3_months

    // Narrative enrichment, None when disabled or no API key is set
    pub enrichment: Option<EnrichmentConfig>,
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            default_style: NarrativeStyle::Executive,
            default_range: AnalysisRange::Last3Months,
            enrichment: None,
        }
    }
}

impl KpiConfig {
    pub fn from_env() -> Result<Self> {
        let default_style = env::var("KPI_DEFAULT_STYLE")
            .unwrap_or_else(|_| "executive".to_string())
            .parse::<NarrativeStyle>()?;
        let default_range = env::var("KPI_DEFAULT_RANGE")
            .unwrap_or_else(|_| "last_3_months".to_string())
            .parse::<AnalysisRange>()
            .map_err(|e| anyhow!(e))?;
        let enrichment_enabled: bool = env::var("KPI_ENRICHMENT_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()?;

        let enrichment = if enrichment_enabled {
            EnrichmentConfig::from_env()
        } else {
            None
        };

        Ok(Self {
            default_style,
            default_range,
            enrichment,
        })
    }

    pub fn enrichment_enabled(&self) -> bool {
        self.enrichment.is_some()
    }
}
