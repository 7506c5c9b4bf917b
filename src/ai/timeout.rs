//! Timeout helpers for async operations.
//!
//! ```ignore
//! use crate::ai::timeout::with_timeout;
//!
//! let response = with_timeout(
//!     Duration::from_secs(60),
//!     provider.generate(&prompt, &schema),
//!     "blueprint generation",
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::constants::network as net_constants;
use crate::types::{ForgeError, Result};

/// Timeouts for the outbound calls the service makes
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Whole LLM request, including retries of a single attempt
    pub llm_request: Duration,
    /// Auth code exchange
    pub auth_exchange: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            llm_request: Duration::from_secs(net_constants::DEFAULT_TIMEOUT_SECS),
            auth_exchange: Duration::from_secs(net_constants::CONNECTION_TIMEOUT_SECS),
        }
    }
}

impl TimeoutConfig {
    pub fn from_llm(config: &LlmConfig) -> Self {
        Self {
            llm_request: Duration::from_secs(config.timeout_secs),
            ..Self::default()
        }
    }
}

/// Execute an async operation with a timeout.
///
/// Returns `ForgeError::Timeout` if the operation doesn't complete in time.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(ForgeError::timeout(operation_name, timeout)),
    }
}
