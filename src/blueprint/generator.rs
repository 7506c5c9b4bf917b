//! Blueprint generation
//!
//! Prompt → provider call (timeout + bounded retry) → JSON extraction →
//! codec → user-flow check. Any failure along the way yields a mock
//! blueprint; [`BlueprintGenerator::generate`] has no error path.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use serde::Serialize;
use tracing::{info, warn};

use super::codec;
use super::mock::{default_user_flow, mock_blueprint};
use super::schema::{OUTPUT_FORMAT, blueprint_schema};
use crate::ai::{
    ErrorClassifier, PromptTemplates, SharedProvider, TimeoutConfig, create_provider,
    is_valid_mermaid, with_timeout,
};
use crate::config::LlmConfig;
use crate::constants::network::{BASE_DELAY_MS, MAX_DELAY_SECS};
use crate::types::{Blueprint, Result};

/// Where a blueprint came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlueprintSource {
    Llm,
    Mock,
}

/// Generated blueprint plus its origin
#[derive(Debug, Clone)]
pub struct GeneratedBlueprint {
    pub blueprint: Blueprint,
    pub source: BlueprintSource,
}

impl GeneratedBlueprint {
    pub fn is_mock(&self) -> bool {
        self.source == BlueprintSource::Mock
    }
}

/// Blueprint generator with mock fallback
#[derive(Clone)]
pub struct BlueprintGenerator {
    provider: Option<SharedProvider>,
    timeouts: TimeoutConfig,
    max_retries: usize,
}

impl std::fmt::Debug for BlueprintGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlueprintGenerator")
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("timeouts", &self.timeouts)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl BlueprintGenerator {
    pub fn new(provider: Option<SharedProvider>, config: &LlmConfig) -> Self {
        Self {
            provider,
            timeouts: TimeoutConfig::from_llm(config),
            max_retries: config.max_retries,
        }
    }

    /// Build from config. A provider that cannot be constructed (e.g. no API
    /// key) leaves the generator in mock-only mode.
    pub fn from_config(config: &LlmConfig) -> Self {
        let provider = match create_provider(config) {
            Ok(provider) => provider,
            Err(e) => {
                warn!("LLM provider unavailable, serving mock blueprints: {}", e);
                None
            }
        };
        Self::new(provider, config)
    }

    /// Mock-only generator
    pub fn mock() -> Self {
        Self {
            provider: None,
            timeouts: TimeoutConfig::default(),
            max_retries: 0,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.as_ref().map_or("mock", |p| p.name())
    }

    /// Generate a blueprint for an idea. Never fails.
    pub async fn generate(&self, title: &str, description: &str) -> GeneratedBlueprint {
        let Some(provider) = &self.provider else {
            info!("No LLM provider configured, using mock blueprint");
            return Self::fallback(title, description);
        };

        match self.generate_with(provider, title, description).await {
            Ok(blueprint) => GeneratedBlueprint {
                blueprint,
                source: BlueprintSource::Llm,
            },
            Err(e) => {
                let classified = ErrorClassifier::classify_forge_error(&e, provider.name());
                warn!(
                    "Blueprint generation failed, falling back to mock data: {}",
                    classified
                );
                Self::fallback(title, description)
            }
        }
    }

    async fn generate_with(
        &self,
        provider: &SharedProvider,
        title: &str,
        description: &str,
    ) -> Result<Blueprint> {
        let prompt = PromptTemplates::blueprint(title, description)
            .section("Output Format", OUTPUT_FORMAT)
            .build();
        let schema = blueprint_schema();
        let name = provider.name().to_string();

        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(BASE_DELAY_MS))
            .with_max_delay(Duration::from_secs(MAX_DELAY_SECS))
            .with_max_times(self.max_retries);

        let (prompt, schema) = (prompt.as_str(), &schema);
        let timeout = self.timeouts.llm_request;

        let response = (|| async move {
            with_timeout(
                timeout,
                provider.generate(prompt, schema),
                "blueprint generation",
            )
            .await
        })
        .retry(backoff)
        .when(|e| ErrorClassifier::classify_forge_error(e, &name).is_retryable())
        .notify(|e, delay| warn!("Retrying {} after {:?}: {}", name, delay, e))
        .await?;

        info!(
            "Blueprint generated by {} ({}) in {}ms, {} tokens",
            response.metadata.provider,
            response.metadata.model,
            response.timing.total_ms,
            response.usage.total()
        );

        let mut blueprint = codec::decode_generated(response.content)?;
        if !is_valid_mermaid(&blueprint.user_flow) {
            warn!("Generated user flow is not a usable diagram, using default flow");
            blueprint.user_flow = default_user_flow(title);
        }
        Ok(blueprint)
    }

    fn fallback(title: &str, description: &str) -> GeneratedBlueprint {
        GeneratedBlueprint {
            blueprint: mock_blueprint(title, description),
            source: BlueprintSource::Mock,
        }
    }
}
