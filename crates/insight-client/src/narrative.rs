use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use kpi_core::{EnrichmentFailure, EnrichmentRequest, Narrative, NarrativeEnricher};

use crate::error::{ClientError, ClientResult};
use crate::EnrichmentConfig;

const SYSTEM_PROMPT: &str = "You are an analytics insight writer.\n\
Use ONLY the provided KPI rows and baseline narrative. Do not guess.\n\
Return ONLY a JSON object with string fields: narrative, risk, recommendation.\n\
Keep the narrative headline style of the baseline.";

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    temperature: f64,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client that rewrites a rule-based narrative.
#[derive(Clone)]
pub struct NarrativeClient {
    client: reqwest::Client,
    config: EnrichmentConfig,
}

impl NarrativeClient {
    pub fn new(config: EnrichmentConfig) -> ClientResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ClientError::MissingApiKey);
        }
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn build_request(&self, request: &EnrichmentRequest) -> ClientResult<ChatRequest> {
        Ok(ChatRequest {
            model: self.config.model.clone(),
            temperature: 0.2,
            response_format: ResponseFormat { kind: "json_object" },
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: serde_json::to_string(request)?,
                },
            ],
        })
    }

    /// Ask the model for a narrative over the request's rows
    pub async fn complete(&self, request: &EnrichmentRequest) -> ClientResult<Narrative> {
        let body = self.build_request(request)?;
        tracing::debug!(
            "Requesting enriched narrative for {} ({} rows, model {})",
            request.metric,
            request.rows.len(),
            self.config.model
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url.trim_end_matches('/')))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::ServiceUnavailable(format!(
                "Status: {}",
                response.status()
            )));
        }

        let chat = response.json::<ChatResponse>().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClientError::InvalidResponse("no completion content".to_string()))?;

        parse_narrative(&content)
    }
}

/// Parse model output into a narrative, tolerating a fenced code block.
pub fn parse_narrative(content: &str) -> ClientResult<Narrative> {
    let trimmed = content.trim();
    let body = if trimmed.starts_with("```") {
        trimmed
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    } else {
        trimmed
    };

    let narrative: Narrative = serde_json::from_str(body)?;
    if !narrative.is_complete() {
        return Err(ClientError::InvalidResponse(
            "narrative, risk and recommendation must be non-empty".to_string(),
        ));
    }
    Ok(narrative)
}

#[async_trait]
impl NarrativeEnricher for NarrativeClient {
    async fn enrich(&self, request: &EnrichmentRequest) -> Result<Narrative, EnrichmentFailure> {
        self.complete(request).await.map_err(EnrichmentFailure::from)
    }

    fn backend_name(&self) -> &'static str {
        "openai-chat"
    }
}
