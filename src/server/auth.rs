//! Auth callback support
//!
//! The callback route trades a one-time code for a session with the auth
//! service, then sends the browser on. Only same-origin relative redirects
//! are honoured.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::ai::{TimeoutConfig, with_timeout};
use crate::config::AuthConfig;
use crate::types::{ForgeError, Result, UserId};

/// Outcome of a successful code exchange
pub struct AuthSession {
    pub user_id: Option<UserId>,
    pub access_token: SecretString,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user_id", &self.user_id)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
pub trait AuthExchange: Send + Sync {
    /// Exchange a callback code. `Ok(None)` when no exchange is configured.
    async fn exchange_code(&self, code: &str) -> Result<Option<AuthSession>>;
}

/// Used when no auth service is configured
pub struct NoAuthExchange;

#[async_trait]
impl AuthExchange for NoAuthExchange {
    async fn exchange_code(&self, _code: &str) -> Result<Option<AuthSession>> {
        debug!("No auth service configured; skipping code exchange");
        Ok(None)
    }
}

/// Code exchange against the auth service's token endpoint
pub struct HttpAuthExchange {
    token_url: Url,
    api_key: Option<SecretString>,
    timeout: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpAuthExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAuthExchange")
            .field("token_url", &self.token_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    user: Option<TokenUser>,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
}

impl HttpAuthExchange {
    pub fn new(api_base: &str, api_key: Option<String>) -> Result<Self> {
        let base = Url::parse(api_base.trim_end_matches('/'))
            .map_err(|e| ForgeError::Config(format!("Invalid auth api_base '{}': {}", api_base, e)))?;
        let mut token_url = base;
        token_url
            .path_segments_mut()
            .map_err(|_| ForgeError::Config(format!("Auth api_base '{}' cannot be a base", api_base)))?
            .pop_if_empty()
            .extend(["auth", "v1", "token"]);
        token_url.set_query(Some("grant_type=pkce"));

        let timeout = TimeoutConfig::default().auth_exchange;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ForgeError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            token_url,
            api_key: api_key.map(SecretString::from),
            timeout,
            client,
        })
    }

    pub fn token_url(&self) -> &str {
        self.token_url.as_str()
    }
}

#[async_trait]
impl AuthExchange for HttpAuthExchange {
    async fn exchange_code(&self, code: &str) -> Result<Option<AuthSession>> {
        let mut request = self
            .client
            .post(self.token_url.clone())
            .json(&serde_json::json!({ "auth_code": code }));
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key.expose_secret());
        }

        let response = with_timeout(
            self.timeout,
            async {
                request
                    .send()
                    .await
                    .map_err(|e| ForgeError::Auth(format!("Auth service unreachable: {}", e)))
            },
            "auth code exchange",
        )
        .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ForgeError::Auth(format!(
                "Code exchange failed ({}): {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ForgeError::Auth(format!("Malformed token response: {}", e)))?;

        let user_id = token.user.map(|u| UserId::new(u.id));
        info!(
            "Auth code exchanged for user {}",
            user_id.as_ref().map_or("<unknown>", |u| u.as_str())
        );
        Ok(Some(AuthSession {
            user_id,
            access_token: SecretString::from(token.access_token),
        }))
    }
}

/// Exchange built from config: HTTP when `api_base` is set.
pub fn exchange_from_config(config: &AuthConfig) -> Result<Box<dyn AuthExchange>> {
    match config.api_base.as_deref().filter(|b| !b.trim().is_empty()) {
        Some(base) => Ok(Box::new(HttpAuthExchange::new(base, config.api_key.clone())?)),
        None => Ok(Box::new(NoAuthExchange)),
    }
}

/// Resolve a post-login redirect.
///
/// Only relative paths that stay on this origin are accepted; anything else
/// (absolute URLs, protocol-relative `//host`, backslash tricks, empty)
/// yields `default`.
pub fn safe_redirect(requested: Option<&str>, default: &str) -> String {
    let Some(raw) = requested.map(str::trim).filter(|r| !r.is_empty()) else {
        return default.to_string();
    };
    if !raw.starts_with('/') || raw.starts_with("//") || raw.contains('\\') {
        return default.to_string();
    }

    const ORIGIN: &str = "http://origin.invalid";
    let resolved = Url::parse(ORIGIN).and_then(|base| base.join(raw));
    match resolved {
        Ok(url) if url.host_str() == Some("origin.invalid") && url.scheme() == "http" => {
            let mut target = url.path().to_string();
            if let Some(query) = url.query() {
                target.push('?');
                target.push_str(query);
            }
            if let Some(fragment) = url.fragment() {
                target.push('#');
                target.push_str(fragment);
            }
            target
        }
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_redirect() {
        assert_eq!(safe_redirect(Some("/projects/1"), "/dashboard"), "/projects/1");
        assert_eq!(safe_redirect(Some("/a?b=c#d"), "/dashboard"), "/a?b=c#d");
        assert_eq!(safe_redirect(None, "/dashboard"), "/dashboard");
        assert_eq!(safe_redirect(Some(""), "/dashboard"), "/dashboard");
        assert_eq!(safe_redirect(Some("https://evil.example"), "/dashboard"), "/dashboard");
        assert_eq!(safe_redirect(Some("//evil.example"), "/dashboard"), "/dashboard");
        assert_eq!(safe_redirect(Some("/\\evil.example"), "/dashboard"), "/dashboard");
        assert_eq!(safe_redirect(Some("dashboard"), "/dashboard"), "/dashboard");
    }

    #[test]
    fn test_token_url() {
        let exchange = HttpAuthExchange::new("https://auth.example.com/", None).unwrap();
        assert_eq!(
            exchange.token_url(),
            "https://auth.example.com/auth/v1/token?grant_type=pkce"
        );
    }

    #[test]
    fn test_invalid_base_is_config_error() {
        let err = HttpAuthExchange::new("not a url", None).unwrap_err();
        assert!(matches!(err, ForgeError::Config(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_auth_error() {
        let exchange = HttpAuthExchange::new("http://127.0.0.1:9", None).unwrap();
        let err = exchange.exchange_code("abc").await.unwrap_err();
        assert!(matches!(err, ForgeError::Auth(_) | ForgeError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_no_exchange() {
        let exchange = exchange_from_config(&AuthConfig::default()).unwrap();
        assert!(exchange.exchange_code("abc").await.unwrap().is_none());
    }
}
