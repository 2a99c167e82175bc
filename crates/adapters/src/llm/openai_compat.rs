//! OpenAI-compatible chat-completions scorer client
//!
//! One POST per analysis attempt; no retries at this layer. Any HTTP or
//! parse failure surfaces as a `ScorerError`, which the pipeline maps to
//! "not analyzed".

use async_trait::async_trait;
use castscore_domain::{AnalysisResult, ScoreInput, Scorer, ScorerError};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{
    ScorerConfig, SYSTEM_INSTRUCTION, build_adjustment_prompt, build_commentary_prompt,
    build_content_prompt, parse_adjustment_response, parse_commentary_response,
    parse_score_response,
};

/// Scorer client for OpenAI-compatible providers
pub struct OpenAiCompatScorer {
    client: Client,
    api_key: SecretString,
    base_url: String,
    config: ScorerConfig,
}

impl OpenAiCompatScorer {
    pub fn new(api_key: SecretString, base_url: String, config: ScorerConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url,
            config,
        }
    }

    async fn call_api(&self, prompt: &str) -> Result<String, ScorerError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
        };

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScorerError::Timeout
                } else {
                    ScorerError::Api(e.to_string())
                }
            })?;

        if response.status() == 429 {
            return Err(ScorerError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ScorerError::Api(format!("API returned {status}: {body}")));
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ScorerError::InvalidFormat(e.to_string()))?;

        let text = api_response
            .choices
            .into_iter()
            .filter_map(|c| c.message.content)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(ScorerError::InvalidFormat("Empty response".to_string()));
        }

        Ok(text)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl Scorer for OpenAiCompatScorer {
    async fn score_content(&self, input: ScoreInput) -> Result<AnalysisResult, ScorerError> {
        let prompt = build_content_prompt(&input.text, input.image_only);
        let response = self.call_api(&prompt).await?;
        parse_score_response(&response).map_err(ScorerError::InvalidFormat)
    }

    async fn score_commentary(
        &self,
        commentary: &str,
        quoted_text: &str,
    ) -> Result<u8, ScorerError> {
        let prompt = build_commentary_prompt(commentary, quoted_text);
        let response = self.call_api(&prompt).await?;
        parse_commentary_response(&response).map_err(ScorerError::InvalidFormat)
    }

    async fn score_adjustment(
        &self,
        commentary: &str,
        quoted_text: &str,
    ) -> Result<i32, ScorerError> {
        let prompt = build_adjustment_prompt(commentary, quoted_text);
        let response = self.call_api(&prompt).await?;
        parse_adjustment_response(&response).map_err(ScorerError::InvalidFormat)
    }
}
