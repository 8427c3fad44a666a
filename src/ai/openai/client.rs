use super::types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::{Error, Result};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Bearer-authenticated client for OpenAI-compatible chat completions.
pub struct OpenAiHttpClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiHttpClient {
    pub fn new_with_client(api_key: String, timeout: Duration, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    /// Point at another OpenAI-compatible host (proxy, local gateway, test server).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        let url = format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH);
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Chat completion request to {} failed: {}", url, e);
                Error::upstream(e.status().map(|s| s.as_u16()), e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::upstream(Some(status.as_u16()), format!("Failed to read OpenAI body: {}", e))
        })?;

        if !status.is_success() {
            tracing::error!("OpenAI API error (status {}): {}", status, body);
            return Err(Error::upstream(
                Some(status.as_u16()),
                format!("OpenAI API error (status {}): {}", status, body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Unparseable chat completion: {}\nBody: {}", e, body);
            Error::upstream(None, format!("Failed to parse OpenAI response: {}", e))
        })
    }
}
