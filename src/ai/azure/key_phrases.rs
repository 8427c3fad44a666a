use super::client::AzureHttpClient;
use super::types::{KeyPhraseRequest, KeyPhraseResponse, TextDocument};
use crate::ai::{KeyPhraseService, TranslationService};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

const DOCUMENT_ID: &str = "1";

/// Key phrase extraction backed by Azure Text Analytics.
///
/// The service works best on English input, so the text is translated
/// before it is analysed.
pub struct AzureKeyPhraseClient {
    http: AzureHttpClient,
    endpoint: String,
    translator: Arc<dyn TranslationService>,
}

impl AzureKeyPhraseClient {
    pub fn new_with_client(
        endpoint: String,
        api_key: String,
        translator: Arc<dyn TranslationService>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: AzureHttpClient::new_with_client(
                "Ocp-Apim-Subscription-Key",
                api_key,
                Duration::from_secs(30),
                client,
            ),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            translator,
        }
    }

    fn key_phrases_url(&self) -> String {
        format!("{}/text/analytics/v3.1/keyPhrases", self.endpoint)
    }
}

#[async_trait]
impl KeyPhraseService for AzureKeyPhraseClient {
    async fn extract_key_phrases(&self, text: &str) -> Result<Vec<String>> {
        let english = self.translator.translate(text, prompts::PROMPT_LANGUAGE).await?;

        let request = KeyPhraseRequest {
            documents: vec![TextDocument {
                id: DOCUMENT_ID.to_string(),
                language: prompts::PROMPT_LANGUAGE.to_string(),
                text: english,
            }],
        };

        let response: KeyPhraseResponse = self
            .http
            .post(&self.key_phrases_url(), &request)
            .await
            .map_err(|e| Error::Extraction(e.to_string()))?;

        if let Some(failure) = response.errors.iter().find(|e| e.id == DOCUMENT_ID) {
            return Err(Error::Extraction(format!(
                "Text Analytics rejected document ({}): {}",
                failure.error.code, failure.error.message
            )));
        }

        let phrases = response
            .documents
            .into_iter()
            .find(|doc| doc.id == DOCUMENT_ID)
            .map(|doc| doc.key_phrases)
            .ok_or_else(|| {
                Error::Extraction("No document in Text Analytics response".to_string())
            })?;

        for phrase in &phrases {
            tracing::info!("Extracted key phrase: {}", phrase);
        }
        tracing::info!("Key phrase extraction complete ({} phrases)", phrases.len());

        Ok(phrases)
    }
}
