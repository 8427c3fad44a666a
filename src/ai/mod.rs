//! AI service integration for translation, key phrase extraction, and image generation
//!
//! Translation goes through an OpenAI-compatible chat completions endpoint,
//! key phrases come from Azure Text Analytics, and images from an Azure
//! OpenAI DALL-E deployment.

pub mod azure;
pub mod mock;
pub mod openai;

pub use azure::{AzureDalleClient, AzureKeyPhraseClient};
pub use mock::{MockImageGenerationClient, MockKeyPhraseClient, MockTranslationClient};
pub use openai::OpenAiTranslationClient;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

#[async_trait]
pub trait KeyPhraseService: Send + Sync {
    /// Extract key phrases from `text`, in the order the provider returns them.
    async fn extract_key_phrases(&self, text: &str) -> Result<Vec<String>>;
}

/// A freshly generated image that still lives on the provider's storage.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub url: String,
    pub revised_prompt: String,
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage>;
}
