//! OpenAI API Provider
//!
//! Chat Completions in JSON mode. The blueprint schema rides in the system
//! message since JSON mode alone does not constrain the shape.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::{
    ErrorClassifier, LlmProvider, LlmResponse, ResponseMetadata, ResponseTiming, TokenUsage,
    http_client, resolve_api_key,
};
use crate::ai::validation::extract_json_from_response;
use crate::config::LlmConfig;
use crate::types::{ForgeError, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const SYSTEM_PROMPT: &str = "You are a startup analyst. Always respond with valid JSON.";
const PROVIDER: &str = "openai";

/// OpenAI provider; the key is only exposed when building the bearer header
pub struct OpenAiProvider {
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = resolve_api_key(config, "OPENAI_API_KEY")?;

        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let model = if config.model.is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            config.model.clone()
        };

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_base,
            model,
            temperature: config.temperature,
            client: http_client(config)?,
        })
    }

    fn request<'a>(&'a self, system: &'a str, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: self.temperature,
            response_format: JsonMode { kind: "json_object" },
        }
    }
}

fn system_message(schema: &Value) -> String {
    if schema.is_null() {
        return SYSTEM_PROMPT.to_string();
    }
    let rendered = serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
    format!("{SYSTEM_PROMPT}\nThe JSON must match this schema:\n\n```json\n{rendered}\n```")
}

/// Pull the first choice's text and the token counts out of a completion.
fn read_completion(completion: ChatCompletion) -> Result<(String, TokenUsage)> {
    let usage = completion
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ForgeError::LlmApi("OpenAI returned no choices".to_string()))?;
    if choice.finish_reason.as_deref() == Some("length") {
        warn!("OpenAI stopped at the token limit; the blueprint may be truncated");
    }
    let text = choice
        .message
        .content
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ForgeError::LlmApi("No content in OpenAI response".to_string()))?;
    Ok((text, usage))
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<LlmResponse> {
        info!("Generating with OpenAI ({}, t={})", self.model, self.temperature);

        let system = system_message(schema);
        let started = Instant::now();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.request(&system, prompt))
            .send()
            .await
            .map_err(|e| ForgeError::LlmApi(format!("OpenAI request failed: {}", e)))?;
        let elapsed = started.elapsed();

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let message = format!("OpenAI API error ({}): {}", status, detail);
            return Err(
                ErrorClassifier::classify_http_status(status.as_u16(), &message, PROVIDER).into(),
            );
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| ForgeError::LlmApi(format!("Unreadable OpenAI response: {}", e)))?;
        let (text, usage) = read_completion(completion)?;
        debug!("OpenAI answered in {:?} ({} tokens)", elapsed, usage.total());

        Ok(LlmResponse::with_metrics(
            extract_json_from_response(&text)?,
            usage,
            ResponseTiming::from_duration(elapsed),
            ResponseMetadata {
                model: self.model.clone(),
                provider: PROVIDER.to_string(),
            },
        ))
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    response_format: JsonMode,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct JsonMode {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    usage: Option<CompletionUsage>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct CompletionUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new(&LlmConfig {
            provider: "openai".to_string(),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_default_model() {
        assert_eq!(provider().model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_request_body_is_json_mode_with_schema() {
        let provider = provider();
        let system = system_message(&json!({"type": "object"}));
        let body = serde_json::to_value(provider.request(&system, "Task Tracker")).unwrap();

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(body["messages"][0]["content"].as_str().unwrap().contains("\"type\": \"object\""));
        assert_eq!(body["messages"][1]["content"], "Task Tracker");
        assert_eq!(system_message(&Value::Null), SYSTEM_PROMPT);
    }

    #[test]
    fn test_read_completion() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "choices": [{"message": {"content": "{\"validation\": {}}"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 30}
        }))
        .unwrap();
        let (text, usage) = read_completion(completion).unwrap();
        assert!(text.contains("validation"));
        assert_eq!(usage.total(), 42);

        for empty in [json!({"choices": []}), json!({"choices": [{"message": {"content": "  "}}]})] {
            let completion: ChatCompletion = serde_json::from_value(empty).unwrap();
            assert!(matches!(read_completion(completion), Err(ForgeError::LlmApi(_))));
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        assert!(!format!("{:?}", provider()).contains("sk-test"));
    }
}
