//! Chat-completion client for the Ark inference endpoint.
//!
//! The endpoint speaks the OpenAI-compatible wire format: a two-message
//! exchange (system instruction, user content) against a fixed model
//! identifier. The `CompletionBackend` trait is the seam tests use to
//! substitute a scripted backend for the network.

use crate::config::{ApiConfig, Credentials};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::{json, Value};

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send one system/user message pair and return the completion text.
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String>;
}

pub struct ArkClient {
    http: Client,
    base_url: String,
    model: String,
    credentials: Credentials,
}

impl ArkClient {
    pub fn new(api: &ApiConfig, credentials: Credentials) -> Self {
        Self {
            http: Client::new(),
            base_url: api.base_url.trim_end_matches('/').to_string(),
            model: api.model.clone(),
            credentials,
        }
    }
}

#[async_trait]
impl CompletionBackend for ArkClient {
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String> {
        debug!("Sending extraction request to {} (model {})", self.base_url, self.model);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header(
                "Authorization",
                format!("Bearer {}", self.credentials.api_key().expose_secret()),
            )
            .json(&json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "system",
                        "content": system_prompt
                    },
                    {
                        "role": "user",
                        "content": user_text
                    }
                ]
            }))
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(anyhow!("Ark API error: status {}, response: {}", status, response_text));
        }

        let response_json: Value = serde_json::from_str(&response_text).map_err(|e| {
            anyhow!("Failed to parse Ark response: {}. Response text: {}", e, response_text)
        })?;

        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("Invalid response format: {}", response_text))?
            .trim()
            .to_string();

        debug!("Raw completion: {}", content);
        Ok(content)
    }
}
