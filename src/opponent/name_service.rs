//! HTTP name source
//!
//! Posts a small JSON description of the opponent to a template service
//! and reads back `{"name": "..."}`. The request carries a timeout so a
//! slow service cannot stall opponent generation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::error::{CombatError, Result};
use crate::opponent::activity::ActivityKind;
use crate::opponent::names::{NameRequest, NameSource};
use crate::opponent::strength::StrengthTier;

const DEFAULT_TIMEOUT_MS: u64 = 1500;

/// Async client for an external name-template service
pub struct TemplateNameClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl TemplateNameClient {
    /// Create a client with explicit configuration
    pub fn new(api_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CombatError::NameServiceError(e.to_string()))?;
        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }

    /// Create a client from environment variables
    ///
    /// Required: NAME_SERVICE_URL
    /// Optional: NAME_SERVICE_KEY, NAME_SERVICE_TIMEOUT_MS
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("NAME_SERVICE_URL")
            .map_err(|_| CombatError::NameServiceError("NAME_SERVICE_URL not set".into()))?;
        let api_key = std::env::var("NAME_SERVICE_KEY").ok();
        let timeout_ms = std::env::var("NAME_SERVICE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Self::new(api_url, api_key, Duration::from_millis(timeout_ms))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl NameSource for TemplateNameClient {
    async fn generate_name(&self, request: &NameRequest) -> Result<Option<String>> {
        let body = TemplateRequest {
            activity: request.activity,
            tier: &request.tier_name,
            strength: request.strength,
        };

        let mut call = self
            .client
            .post(&self.api_url)
            .header("content-type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            call = call.header("Authorization", format!("Bearer {}", key));
        }

        let response = call
            .send()
            .await
            .map_err(|e| CombatError::NameServiceError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CombatError::NameServiceError(format!(
                "service error: {}",
                error_text
            )));
        }

        let reply: TemplateResponse = response
            .json()
            .await
            .map_err(|e| CombatError::NameServiceError(e.to_string()))?;

        Ok(reply
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()))
    }
}

#[derive(Serialize)]
struct TemplateRequest<'a> {
    activity: ActivityKind,
    tier: &'a str,
    strength: StrengthTier,
}

#[derive(Deserialize)]
struct TemplateResponse {
    #[serde(default)]
    name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = TemplateNameClient::new(
            "https://names.example.com/v1/opponent".into(),
            Some("test-key".into()),
            Duration::from_millis(200),
        )
        .unwrap();
        assert_eq!(client.api_url(), "https://names.example.com/v1/opponent");
        assert_eq!(client.api_key.as_deref(), Some("test-key"));
    }

    #[test]
    fn test_from_env_missing_url() {
        let result = TemplateNameClient::from_env();
        if std::env::var("NAME_SERVICE_URL").is_err() {
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_response_without_name() {
        let reply: TemplateResponse = serde_json::from_str("{}").unwrap();
        assert!(reply.name.is_none());
    }
}
