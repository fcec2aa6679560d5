//! LLM summarization client
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_LLM_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str =
  "You summarise travel deals and guest reviews for people browsing places to stay. Be concise and factual.";

const STRUCTURED_INSTRUCTIONS: &str = "Respond with a JSON object of the form \
  {\"summary\": \"<two or three sentences>\", \"tags\": [\"<short tag>\", ...]} and nothing else.";

#[derive(Debug, Error)]
pub enum LlmError {
  #[error("LLM request failed: {message}")]
  Request { message: String },

  #[error("LLM API error ({status}): {message}")]
  Api { status: u16, message: String },

  #[error("Unexpected LLM response: {message}")]
  InvalidResponse { message: String },

  #[error("LLM returned a malformed summary: {message}")]
  MalformedSummary { message: String },

  #[error("Summaries are not configured (set OPENAI_API_KEY)")]
  NotConfigured,
}

/// Parsed reply of a structured summary request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredSummary {
  pub summary: String,
  #[serde(default)]
  pub tags: Vec<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
  /// Free-text summary of the prompt
  async fn summarize(&self, prompt: &str) -> Result<String, LlmError>;

  /// Summary plus tags, parsed from a JSON reply
  async fn summarize_structured(&self, prompt: &str) -> Result<StructuredSummary, LlmError>;

  /// Model name recorded alongside cached summaries
  fn model(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub max_tokens: u32,
  pub temperature: f32,
  pub timeout_secs: u64,
}

impl LlmConfig {
  pub fn new(api_key: &str) -> Self {
    Self {
      api_key: api_key.to_string(),
      base_url: DEFAULT_LLM_URL.to_string(),
      model: DEFAULT_LLM_MODEL.to_string(),
      max_tokens: 400,
      temperature: 0.3,
      timeout_secs: 60,
    }
  }
}

pub struct ChatCompletionsClient {
  client: Client,
  config: LlmConfig,
}

impl ChatCompletionsClient {
  pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| LlmError::Request { message: e.to_string() })?;
    Ok(Self { client, config })
  }

  fn endpoint(&self) -> String {
    if self.config.base_url.ends_with('/') {
      format!("{}chat/completions", self.config.base_url)
    } else {
      format!("{}/chat/completions", self.config.base_url)
    }
  }

  async fn complete(&self, user: &str, json_mode: bool) -> Result<String, LlmError> {
    let mut body = json!({
      "model": self.config.model,
      "messages": [
        { "role": "system", "content": SYSTEM_PROMPT },
        { "role": "user", "content": user }
      ],
      "max_tokens": self.config.max_tokens,
      "temperature": self.config.temperature,
    });
    if json_mode {
      body["response_format"] = json!({ "type": "json_object" });
    }

    tracing::debug!(model = %self.config.model, json_mode, "requesting chat completion");

    let response = self
      .client
      .post(self.endpoint())
      .bearer_auth(&self.config.api_key)
      .json(&body)
      .send()
      .await
      .map_err(|e| LlmError::Request { message: e.to_string() })?;

    if !response.status().is_success() {
      let status = response.status().as_u16();
      let text = response.text().await.unwrap_or_default();
      return Err(LlmError::Api { status, message: text });
    }

    let reply: Value =
      response.json().await.map_err(|e| LlmError::InvalidResponse { message: e.to_string() })?;

    reply["choices"][0]["message"]["content"]
      .as_str()
      .map(|s| s.trim().to_string())
      .ok_or_else(|| LlmError::InvalidResponse { message: "missing choices[0].message.content".to_string() })
  }
}

/// Parse a structured reply, tolerating a fenced code block around the JSON
pub fn parse_structured(reply: &str) -> Result<StructuredSummary, LlmError> {
  let trimmed = reply.trim();
  let unfenced = trimmed
    .strip_prefix("```json")
    .or_else(|| trimmed.strip_prefix("```"))
    .and_then(|rest| rest.strip_suffix("```"))
    .unwrap_or(trimmed)
    .trim();

  let parsed: StructuredSummary = serde_json::from_str(unfenced)
    .map_err(|e| LlmError::MalformedSummary { message: e.to_string() })?;

  if parsed.summary.trim().is_empty() {
    return Err(LlmError::MalformedSummary { message: "empty summary".to_string() });
  }
  Ok(parsed)
}

#[async_trait]
impl Summarizer for ChatCompletionsClient {
  async fn summarize(&self, prompt: &str) -> Result<String, LlmError> {
    self.complete(prompt, false).await
  }

  async fn summarize_structured(&self, prompt: &str) -> Result<StructuredSummary, LlmError> {
    let user = format!("{prompt}\n\n{STRUCTURED_INSTRUCTIONS}");
    let reply = self.complete(&user, true).await?;
    parse_structured(&reply)
  }

  fn model(&self) -> String {
    self.config.model.clone()
  }
}
