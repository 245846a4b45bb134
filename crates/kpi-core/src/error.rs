use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KpiError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Unknown style: {0}")]
    UnknownStyle(String),
}

/// Why an enriched narrative could not be produced.
///
/// Callers never surface this to clients: any variant means "use the
/// rule-based narrative instead".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnrichmentFailure {
    #[error("Enrichment disabled")]
    Disabled,

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Timeout")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
