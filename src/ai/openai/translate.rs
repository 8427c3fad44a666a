use super::client::OpenAiHttpClient;
use super::types::{ChatCompletionRequest, ChatMessage};
use crate::ai::TranslationService;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Translates text through a chat completion model.
pub struct OpenAiTranslationClient {
    http: OpenAiHttpClient,
    model: String,
}

impl OpenAiTranslationClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(api_key, Duration::from_secs(30), client),
            model,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl TranslationService for OpenAiTranslationClient {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        tracing::debug!("Translating {} chars into '{}'", text.len(), target_language);

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(prompts::render(
                    prompts::TRANSLATE_SYSTEM,
                    &[("language", target_language)],
                )),
                ChatMessage::user(text),
            ],
            max_completion_tokens: 1000,
            temperature: Some(0.0),
        };

        let response = self
            .http
            .chat_completion(&request)
            .await
            .map_err(|e| Error::Translation(e.to_string()))?;

        let translated = response
            .first_text()
            .ok_or_else(|| Error::Translation("No translation in OpenAI response".to_string()))?;

        tracing::info!("Translated '{}' -> '{}'", text, translated);
        Ok(translated.to_string())
    }
}
