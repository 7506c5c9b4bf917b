//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (user config dir) and project (.ideaforge/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{chart, network, session};
use crate::types::{ForgeError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// HTTP server settings
    pub server: ServerConfig,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Storage settings
    pub storage: StorageConfig,

    /// Radar chart rendering settings
    pub chart: ChartConfig,

    /// Auth callback settings
    pub auth: AuthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            server: ServerConfig::default(),
            llm: LlmConfig::default(),
            storage: StorageConfig::default(),
            chart: ChartConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ForgeError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ForgeError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ForgeError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !matches!(self.llm.provider.as_str(), "gemini" | "openai" | "mock") {
            return Err(ForgeError::Config(format!(
                "Unknown LLM provider '{}'. Supported: gemini, openai, mock",
                self.llm.provider
            )));
        }

        if self.server.session_ttl_secs == 0 || self.server.max_sessions == 0 {
            return Err(ForgeError::Config(
                "Server session_ttl_secs and max_sessions must be greater than 0".to_string(),
            ));
        }

        if self.chart.width <= 0.0 || self.chart.height <= 0.0 {
            return Err(ForgeError::Config(
                "Chart width and height must be positive".to_string(),
            ));
        }

        if !(self.chart.device_pixel_ratio > 0.0 && self.chart.device_pixel_ratio <= 8.0) {
            return Err(ForgeError::Config(format!(
                "Chart device_pixel_ratio must be in (0, 8], got {}",
                self.chart.device_pixel_ratio
            )));
        }

        if self.chart.activation_radius < 0.0 {
            return Err(ForgeError::Config(
                "Chart activation_radius must not be negative".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Idle seconds before an in-memory session is dropped
    pub session_ttl_secs: u64,

    /// Maximum live in-memory sessions
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            session_ttl_secs: session::DEFAULT_SESSION_TTL_SECS,
            max_sessions: session::DEFAULT_MAX_SESSIONS,
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: gemini, openai, mock
    pub provider: String,

    /// Model name (provider default when empty)
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Temperature for generation
    pub temperature: f32,

    /// Retries on transient failures before falling back to mock data
    pub max_retries: usize,

    /// API key; never serialized back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Custom API base URL
    pub api_base: Option<String>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_retries", &self.max_retries)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: String::new(),
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.7,
            max_retries: network::DEFAULT_MAX_RETRIES,
            api_key: None,
            api_base: None,
        }
    }
}

// =============================================================================
// Storage Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file (remote tier)
    pub database_path: PathBuf,

    /// JSON file holding the CLI session tier
    pub session_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(".ideaforge/ideaforge.db"),
            session_path: PathBuf::from(".ideaforge/session.json"),
        }
    }
}

// =============================================================================
// Chart Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// CSS width of the surface
    pub width: f64,

    /// CSS height of the surface
    pub height: f64,

    /// Device pixel ratio used for the draw buffer
    pub device_pixel_ratio: f64,

    /// Hover activation radius (CSS px)
    pub activation_radius: f64,

    /// Entrance animation duration (ms)
    pub animation_ms: u64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: chart::DEFAULT_WIDTH,
            height: chart::DEFAULT_HEIGHT,
            device_pixel_ratio: 1.0,
            activation_radius: chart::DEFAULT_ACTIVATION_RADIUS,
            animation_ms: chart::DEFAULT_ANIMATION_MS,
        }
    }
}

// =============================================================================
// Auth Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Auth service base URL; code exchange is skipped when unset
    pub api_base: Option<String>,

    /// Public API key sent with the exchange; never serialized back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Landing path when the callback carries no usable redirect
    pub default_redirect: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("default_redirect", &self.default_redirect)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            api_key: None,
            default_redirect: network::DEFAULT_REDIRECT.to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.chart.activation_radius, 20.0);
        assert_eq!(config.chart.animation_ms, 1500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut config = Config::default();
        config.llm.provider = "claude-code".to_string();
        assert!(matches!(config.validate(), Err(ForgeError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_pixel_ratio() {
        let mut config = Config::default();
        config.chart.device_pixel_ratio = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unbounded_sessions() {
        let mut config = Config::default();
        config.server.max_sessions = 0;
        assert!(matches!(config.validate(), Err(ForgeError::Config(_))));
    }

    #[test]
    fn test_api_key_redacted() {
        let mut config = LlmConfig::default();
        config.api_key = Some("sk-secret".to_string());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));

        let serialized = serde_json::to_string(&config).unwrap();
        assert!(!serialized.contains("sk-secret"));
    }
}
