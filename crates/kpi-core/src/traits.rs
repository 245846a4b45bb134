use async_trait::async_trait;
use crate::{EnrichmentFailure, EnrichmentRequest, Narrative};

/// Optional narrative source (typically an LLM).
///
/// Implementations must return a narrative with the same shape as the
/// rule-based synthesizer; the caller falls back to the rule-based output on
/// any `Err`.
#[async_trait]
pub trait NarrativeEnricher: Send + Sync {
    async fn enrich(&self, request: &EnrichmentRequest) -> Result<Narrative, EnrichmentFailure>;

    fn backend_name(&self) -> &'static str;
}
