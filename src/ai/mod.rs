//! AI Integration Layer
//!
//! LLM providers, prompt construction, timeouts and response validation
//! used by blueprint generation.

pub mod prompt;
pub mod provider;
pub mod timeout;
pub mod validation;

pub use prompt::{PromptBuilder, PromptSection, PromptTemplates};
pub use provider::{
    ErrorCategory, ErrorClassifier, GeminiProvider, LlmError, LlmProvider, LlmResponse,
    OpenAiProvider, ResponseMetadata, ResponseTiming, SharedProvider, TokenUsage, create_provider,
};
pub use timeout::{TimeoutConfig, with_timeout};
pub use validation::{JsonRepairer, extract_json_from_response, is_valid_mermaid};
