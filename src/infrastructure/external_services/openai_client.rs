use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::embedding_provider::{EmbeddingProvider, EmbeddingProviderError};
use crate::application::ports::model_gateway::{ModelGateway, ModelGatewayError, OutputSchema};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

// gpt-4o-mini rates: $0.15 per 1M input tokens, $0.60 per 1M output tokens.
const INPUT_COST_DOLLAR_PER_TOKEN: f64 = 0.15 / 1_000_000.0;
const OUTPUT_COST_DOLLAR_PER_TOKEN: f64 = 0.60 / 1_000_000.0;

#[derive(Debug, Clone)]
pub struct OpenAiClientConfig {
    pub api_base: String,
    pub api_key: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub show_usage_cost: bool,
}

impl OpenAiClientConfig {
    /// Missing credentials are a configuration error, fatal at startup.
    pub fn from_env() -> Result<Self, ModelGatewayError> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            ModelGatewayError::ConfigurationError("OPENAI_API_KEY not set".to_string())
        })?;

        Ok(Self {
            api_base: env::var("OPENAI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            api_key,
            chat_model: env::var("OPENAI_CHAT_MODEL")
                .unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string()),
            embedding_model: env::var("OPENAI_EMBEDDING_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
            temperature: 0.7,
            timeout_secs: 30,
            show_usage_cost: true,
        })
    }
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct TokenUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

#[derive(Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Hosted OpenAI API client. Serves as both the chat-completion gateway and
/// the embedding provider, so one configured credential covers both ports.
///
/// Calls are single attempts: network, auth and quota failures propagate to
/// the caller without retries.
pub struct OpenAiClient {
    client: Client,
    config: OpenAiClientConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiClientConfig) -> Result<Self, ModelGatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ModelGatewayError::ConfigurationError(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, ModelGatewayError> {
        Self::new(OpenAiClientConfig::from_env()?)
    }

    async fn chat(
        &self,
        prompt: &str,
        json_output: bool,
    ) -> Result<String, ModelGatewayError> {
        let request = ChatCompletionRequest {
            model: self.config.chat_model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.config.temperature,
            response_format: json_output.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelGatewayError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelGatewayError::ApiError(format!("{}: {}", status, body)));
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| ModelGatewayError::ParseError(e.to_string()))?;

        if self.config.show_usage_cost {
            if let Some(usage) = completion.usage {
                log_usage(usage);
            }
        }

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ModelGatewayError::ApiError("Model returned no content".to_string()))
    }
}

#[async_trait]
impl ModelGateway for OpenAiClient {
    async fn generate_response(&self, prompt: &str) -> Result<String, ModelGatewayError> {
        let response_text = self.chat(prompt, false).await?;
        log::debug!("Model response: {}", response_text);
        Ok(response_text)
    }

    async fn generate_response_with_structured_output(
        &self,
        prompt: &str,
        schema: &OutputSchema,
    ) -> Result<serde_json::Value, ModelGatewayError> {
        let full_prompt = format!("{}\n\n{}\n", prompt, schema.format_instructions());
        let response_text = self.chat(&full_prompt, true).await?;
        log::debug!("Model response: {}", response_text);

        // Some model revisions wrap the JSON in a Markdown code block even
        // when asked not to.
        let cleaned = strip_code_fences(&response_text);
        let value: serde_json::Value = serde_json::from_str(cleaned)
            .map_err(|e| ModelGatewayError::ParseError(e.to_string()))?;
        schema
            .validate(&value)
            .map_err(ModelGatewayError::ParseError)?;
        Ok(value)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingProviderError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        if vectors.is_empty() {
            return Err(EmbeddingProviderError::ApiError(
                "No embeddings returned".to_string(),
            ));
        }
        Ok(vectors.remove(0))
    }

    async fn embed_batch(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingsRequest {
            model: self.config.embedding_model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingProviderError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingProviderError::ApiError(format!(
                "{}: {}",
                status, body
            )));
        }

        let embeddings = response
            .json::<EmbeddingsResponse>()
            .await
            .map_err(|e| EmbeddingProviderError::ApiError(e.to_string()))?;

        if embeddings.data.len() != texts.len() {
            return Err(EmbeddingProviderError::ApiError(format!(
                "Mismatch: {} inputs but {} embeddings",
                texts.len(),
                embeddings.data.len()
            )));
        }

        Ok(embeddings.data.into_iter().map(|d| d.embedding).collect())
    }

    fn model_name(&self) -> &str {
        &self.config.embedding_model
    }
}

fn log_usage(usage: TokenUsage) {
    let (input_cost_dollar, output_cost_dollar, total_cost_dollar) =
        calculate_cost(usage.prompt_tokens, usage.completion_tokens);

    log::info!("Input tokens: {}", usage.prompt_tokens);
    log::info!("Output tokens: {}", usage.completion_tokens);
    log::info!("Total tokens: {}", usage.total_tokens);
    log::info!(
        "Cost - Input: {:.6} USD, Output: {:.6} USD, Total: {:.6} USD",
        input_cost_dollar,
        output_cost_dollar,
        total_cost_dollar
    );
}

fn calculate_cost(prompt_tokens: u64, completion_tokens: u64) -> (f64, f64, f64) {
    let input_cost_dollar = prompt_tokens as f64 * INPUT_COST_DOLLAR_PER_TOKEN;
    let output_cost_dollar = completion_tokens as f64 * OUTPUT_COST_DOLLAR_PER_TOKEN;
    (
        input_cost_dollar,
        output_cost_dollar,
        input_cost_dollar + output_cost_dollar,
    )
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}
