use super::{GeneratedImage, ImageGenerationService, KeyPhraseService, TranslationService};
use crate::themes::ImageStyle;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Translation double; unknown texts come back prefixed with the target language.
#[derive(Clone)]
pub struct MockTranslationClient {
    translations: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<String>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockTranslationClient {
    pub fn new() -> Self {
        Self {
            translations: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_translation(self, source: &str, translated: &str) -> Self {
        self.translations
            .lock()
            .unwrap()
            .insert(source.to_string(), translated.to_string());
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockTranslationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranslationService for MockTranslationClient {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        self.calls.lock().unwrap().push(text.to_string());

        if *self.should_fail.lock().unwrap() {
            return Err(Error::Translation("Mock translation failure".to_string()));
        }

        let translations = self.translations.lock().unwrap();
        Ok(translations
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("{}:{}", target_language, text)))
    }
}

#[derive(Clone)]
pub struct MockKeyPhraseClient {
    phrases: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockKeyPhraseClient {
    pub fn new() -> Self {
        Self {
            phrases: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_phrase(self, phrase: &str) -> Self {
        self.phrases.lock().unwrap().push(phrase.to_string());
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockKeyPhraseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyPhraseService for MockKeyPhraseClient {
    async fn extract_key_phrases(&self, _text: &str) -> Result<Vec<String>> {
        *self.call_count.lock().unwrap() += 1;

        if *self.should_fail.lock().unwrap() {
            return Err(Error::Extraction("Mock extraction failure".to_string()));
        }

        Ok(self.phrases.lock().unwrap().clone())
    }
}

const MOCK_PROVIDER_URL: &str = "https://mock-provider.example.com";

/// Image generation double.
///
/// The returned URL names the style detected in the prompt, so callers can
/// check ordering. Per-style delays and scripted failures simulate slow or
/// flaky providers.
#[derive(Clone)]
pub struct MockImageGenerationClient {
    delays: Arc<Mutex<HashMap<ImageStyle, Duration>>>,
    failures_remaining: Arc<Mutex<HashMap<ImageStyle, usize>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            delays: Arc::new(Mutex::new(HashMap::new())),
            failures_remaining: Arc::new(Mutex::new(HashMap::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_delay(self, style: ImageStyle, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(style, delay);
        self
    }

    /// Fail the next `count` calls for `style`.
    pub fn with_failures(self, style: ImageStyle, count: usize) -> Self {
        self.failures_remaining.lock().unwrap().insert(style, count);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn detect_style(prompt: &str) -> Option<ImageStyle> {
        ImageStyle::ALL
            .into_iter()
            .find(|style| prompt.contains(style.descriptor()))
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let style = Self::detect_style(prompt);
        let delay = style.and_then(|s| self.delays.lock().unwrap().get(&s).copied());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(style) = style {
            let mut failures = self.failures_remaining.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&style) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(Error::upstream(Some(500), "Mock provider failure"));
                }
            }
        }

        let label = style.map(|s| s.label()).unwrap_or("unknown");
        Ok(GeneratedImage {
            url: format!("{}/{}.png", MOCK_PROVIDER_URL, label),
            revised_prompt: format!("Revised: {}", prompt),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_translation_defaults_and_overrides() {
        let client = MockTranslationClient::new().with_translation("할인", "discount");

        assert_eq!(client.translate("할인", "en").await.unwrap(), "discount");
        assert_eq!(client.translate("행사", "en").await.unwrap(), "en:행사");
        assert_eq!(client.get_calls(), vec!["할인", "행사"]);
    }

    #[tokio::test]
    async fn test_mock_translation_failure() {
        let client = MockTranslationClient::new().with_failure(true);
        let err = client.translate("text", "en").await.unwrap_err();
        assert!(matches!(err, Error::Translation(_)));
        assert_eq!(client.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_key_phrases() {
        let client = MockKeyPhraseClient::new()
            .with_phrase("spring")
            .with_phrase("sale");

        let phrases = client.extract_key_phrases("anything").await.unwrap();
        assert_eq!(phrases, vec!["spring", "sale"]);
        assert_eq!(client.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_image_generation_names_style() {
        let client = MockImageGenerationClient::new();
        let prompt = format!("An image in {}", ImageStyle::Animated.descriptor());

        let image = client.generate_image(&prompt).await.unwrap();
        assert_eq!(image.url, "https://mock-provider.example.com/animated.png");
        assert!(image.revised_prompt.starts_with("Revised:"));
    }

    #[tokio::test]
    async fn test_mock_image_generation_scripted_failures() {
        let client = MockImageGenerationClient::new().with_failures(ImageStyle::Minimalist, 2);
        let prompt = ImageStyle::Minimalist.descriptor();

        assert!(client.generate_image(prompt).await.is_err());
        assert!(client.generate_image(prompt).await.is_err());
        assert!(client.generate_image(prompt).await.is_ok());
        assert_eq!(client.get_call_count(), 3);
    }
}
