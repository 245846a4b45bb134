use kpi_core::EnrichmentFailure;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("API key not configured")]
    MissingApiKey,
}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<ClientError> for EnrichmentFailure {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::RequestFailed(e) if e.is_timeout() => EnrichmentFailure::Timeout,
            ClientError::RequestFailed(e) => EnrichmentFailure::Request(e.to_string()),
            ClientError::ServiceUnavailable(msg) => EnrichmentFailure::Unavailable(msg),
            ClientError::InvalidResponse(msg) => EnrichmentFailure::InvalidResponse(msg),
            ClientError::Serialization(e) => EnrichmentFailure::InvalidResponse(e.to_string()),
            ClientError::MissingApiKey => EnrichmentFailure::Disabled,
        }
    }
}
