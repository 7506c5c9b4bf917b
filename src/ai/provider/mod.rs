//! LLM Provider Abstraction
//!
//! Defines the LlmProvider trait for structured LLM output generation.
//! Providers return `LlmResponse` carrying the JSON extracted from the
//! model's text plus token usage for logging.
//!
//! ## Providers
//!
//! - `gemini`: Google Generative Language API (default)
//! - `openai`: OpenAI Chat Completions API
//! - `mock`: no provider; the generator answers with mock blueprints

mod gemini;
mod openai;

pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;

pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::types::{ForgeError, Result};

// =============================================================================
// LLM Response with Usage Metrics
// =============================================================================

/// LLM response including content and usage metrics
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// JSON extracted from the generated text
    pub content: Value,
    /// Token usage metrics
    pub usage: TokenUsage,
    /// Response timing
    pub timing: ResponseTiming,
    /// Provider and model info
    pub metadata: ResponseMetadata,
}

impl LlmResponse {
    /// Create response with content only (usage unknown)
    pub fn content_only(content: Value) -> Self {
        Self {
            content,
            usage: TokenUsage::default(),
            timing: ResponseTiming::default(),
            metadata: ResponseMetadata::default(),
        }
    }

    pub fn with_metrics(
        content: Value,
        usage: TokenUsage,
        timing: ResponseTiming,
        metadata: ResponseMetadata,
    ) -> Self {
        Self {
            content,
            usage,
            timing,
            metadata,
        }
    }
}

/// Token usage metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Response timing metrics
#[derive(Debug, Clone, Default)]
pub struct ResponseTiming {
    /// Total response time in milliseconds (wall clock)
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

/// Response metadata
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    pub model: String,
    pub provider: String,
}

/// Shared LLM provider handle.
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// LLM Provider trait for structured output generation
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate structured output guided by a JSON Schema
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;
}

/// Create a shared provider from configuration.
///
/// Returns `Ok(None)` for the `mock` provider.
pub fn create_provider(config: &LlmConfig) -> Result<Option<SharedProvider>> {
    match config.provider.as_str() {
        "gemini" => Ok(Some(Arc::new(GeminiProvider::new(config)?))),
        "openai" => Ok(Some(Arc::new(OpenAiProvider::new(config)?))),
        "mock" => Ok(None),
        _ => Err(ForgeError::Config(format!(
            "Unknown provider: {}. Supported: gemini, openai, mock",
            config.provider
        ))),
    }
}

/// Build an HTTP client for a provider with the configured timeouts.
pub(crate) fn http_client(config: &LlmConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .connect_timeout(std::time::Duration::from_secs(
            crate::constants::network::CONNECTION_TIMEOUT_SECS,
        ))
        .build()
        .map_err(|e| ForgeError::LlmApi(format!("Failed to create HTTP client: {}", e)))
}

/// Resolve an API key from config or the given environment variable.
pub(crate) fn resolve_api_key(config: &LlmConfig, env_var: &str) -> Result<String> {
    config
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| std::env::var(env_var).ok())
        .ok_or_else(|| {
            ForgeError::Config(format!(
                "{} API key not found. Set {} or llm.api_key in config",
                config.provider, env_var
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_is_none() {
        let config = LlmConfig {
            provider: "mock".to_string(),
            ..Default::default()
        };
        assert!(create_provider(&config).unwrap().is_none());
    }

    #[test]
    fn test_unknown_provider() {
        let config = LlmConfig {
            provider: "ollama".to_string(),
            ..Default::default()
        };
        assert!(matches!(create_provider(&config), Err(ForgeError::Config(_))));
    }

    #[test]
    fn test_explicit_key_builds_provider() {
        let config = LlmConfig {
            provider: "openai".to_string(),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        let provider = create_provider(&config).unwrap().unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_token_usage_total() {
        assert_eq!(TokenUsage::new(100, 50).total(), 150);
    }
}
