//! Multi-style image generation for one user submission.
//!
//! Text inputs are prepared sequentially (mood/season resolution, keyword
//! translation, key phrase extraction), then one retry-wrapped task per
//! [`ImageStyle`] runs concurrently. The request only succeeds when every
//! style produced a persisted image.

use crate::ai::{
    AzureDalleClient, AzureKeyPhraseClient, ImageGenerationService, KeyPhraseService,
    OpenAiTranslationClient, TranslationService,
};
use crate::cdn::{CdnClient, CdnService, MockCdnClient};
use crate::models::{Config, GenerationRequest, GenerationResult};
use crate::persist::{AssetPersister, RemoteAssetPersister};
use crate::prompts::{self, PROMPT_LANGUAGE};
use crate::retry::{with_retry, RetryPolicy, Sleeper, TokioSleeper};
use crate::themes::{ImageStyle, Mood, Season};
use crate::{Error, Result};
use chrono::Local;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{error, info};

/// Injectable service bundle used to construct [`ImageGenerator`] in tests/harnesses.
pub struct GeneratorServices {
    pub translator: Arc<dyn TranslationService>,
    pub key_phrases: Arc<dyn KeyPhraseService>,
    pub image_gen: Arc<dyn ImageGenerationService>,
    pub persister: Arc<dyn AssetPersister>,
    pub sleeper: Arc<dyn Sleeper>,
}

pub struct ImageGenerator {
    translator: Arc<dyn TranslationService>,
    key_phrases: Arc<dyn KeyPhraseService>,
    worker: StyleWorker,
}

/// Everything one style task needs; cheap to clone into a spawned task.
#[derive(Clone)]
struct StyleWorker {
    image_gen: Arc<dyn ImageGenerationService>,
    persister: Arc<dyn AssetPersister>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    permits: Arc<Semaphore>,
}

impl ImageGenerator {
    /// Build a generator from concrete service dependencies.
    ///
    /// `concurrency` bounds how many generation attempts may be in flight
    /// at once across all requests sharing this generator.
    pub fn with_services(
        services: GeneratorServices,
        policy: RetryPolicy,
        concurrency: usize,
    ) -> Self {
        Self {
            translator: services.translator,
            key_phrases: services.key_phrases,
            worker: StyleWorker {
                image_gen: services.image_gen,
                persister: services.persister,
                sleeper: services.sleeper,
                policy,
                permits: Arc::new(Semaphore::new(concurrency.max(1))),
            },
        }
    }

    /// Construct the production service graph from configuration.
    ///
    /// Retry backoff sleeps end early once `shutdown` flips to `true`.
    pub async fn from_config(config: &Config, shutdown: watch::Receiver<bool>) -> Result<Self> {
        // Reuse one HTTP connection pool across provider clients.
        let http_client = reqwest::Client::new();

        let translator: Arc<dyn TranslationService> = Arc::new(
            OpenAiTranslationClient::new_with_client(
                config.openai_api_key.clone(),
                config.translation_model.clone(),
                http_client.clone(),
            )
            .with_base_url(config.openai_base_url.clone()),
        );
        info!("Translation model: {}", config.translation_model);

        let key_phrases = Arc::new(AzureKeyPhraseClient::new_with_client(
            config.text_analytics_endpoint.clone(),
            config.text_analytics_key.clone(),
            translator.clone(),
            http_client.clone(),
        ));

        let image_gen = Arc::new(AzureDalleClient::new_with_client(
            config.dalle_endpoint.clone(),
            config.dalle_api_version.clone(),
            config.dalle_api_key.clone(),
            http_client.clone(),
        ));

        let cdn: Arc<dyn CdnService> = if config.dry_run {
            info!("DRY_RUN enabled, images are kept in memory instead of the CDN");
            Arc::new(MockCdnClient::new().with_base_url(config.cdn_base_url.clone()))
        } else {
            Arc::new(CdnClient::from_config(config).await?)
        };

        let persister = Arc::new(RemoteAssetPersister::new_with_client(cdn, http_client));

        Ok(Self::with_services(
            GeneratorServices {
                translator,
                key_phrases,
                image_gen,
                persister,
                sleeper: Arc::new(TokioSleeper::new().with_shutdown(shutdown)),
            },
            RetryPolicy::default(),
            config.generation_concurrency,
        ))
    }

    /// Generate one persisted image per style, in [`ImageStyle::ALL`] order.
    pub async fn generate_images(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        let mood: Mood = request.mood.parse()?;
        let season: Season = request.season.parse()?;
        if request.input_message.trim().is_empty() {
            return Err(Error::Validation("Input message must not be blank".to_string()));
        }

        info!(
            "Generating images for user {} (mood {:?}, season {:?}, {} keywords)",
            request.user_id,
            mood,
            season,
            request.keywords.len()
        );

        let key_phrases = self.collect_key_phrases(request).await?;
        let english_message = self
            .translator
            .translate(&request.input_message, PROMPT_LANGUAGE)
            .await?;

        let started = Instant::now();
        let mut tasks = JoinSet::new();
        for (index, style) in ImageStyle::ALL.into_iter().enumerate() {
            let prompt = prompts::compose_image_prompt(
                style,
                &key_phrases,
                &english_message,
                mood.describe(),
                season.describe(),
            );
            let worker = self.worker.clone();
            tasks.spawn(async move { (index, worker.run(style, prompt).await) });
        }

        let mut outcomes: Vec<Option<Result<String>>> =
            ImageStyle::ALL.iter().map(|_| None).collect();
        let mut join_failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(e) => join_failures.push(e.to_string()),
            }
        }

        let elapsed = started.elapsed();
        info!(
            "Image generation finished at {} ({:.1}s elapsed)",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            elapsed.as_secs_f64()
        );

        let mut generated_image_urls = Vec::with_capacity(outcomes.len());
        let mut first_failure = None;
        for (style, outcome) in ImageStyle::ALL.into_iter().zip(outcomes) {
            let outcome = outcome.unwrap_or_else(|| {
                Err(Error::Invariant(format!(
                    "[{}] generation task did not complete: {}",
                    style,
                    join_failures.join("; ")
                )))
            });
            match outcome {
                Ok(url) => generated_image_urls.push(url),
                Err(e) => {
                    error!("[{}] Image generation failed: {}", style, e);
                    first_failure.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_failure {
            return Err(e);
        }

        Ok(GenerationResult {
            generated_image_urls,
        })
    }

    /// Translated keywords in input order, followed by phrases extracted
    /// from the whole message. Blank keywords are skipped.
    async fn collect_key_phrases(&self, request: &GenerationRequest) -> Result<Vec<String>> {
        let mut key_phrases = Vec::with_capacity(request.keywords.len());
        for keyword in request.keywords.iter().filter(|k| !k.trim().is_empty()) {
            key_phrases.push(self.translator.translate(keyword, PROMPT_LANGUAGE).await?);
        }

        let extracted = self
            .key_phrases
            .extract_key_phrases(&request.input_message)
            .await?;
        key_phrases.extend(extracted);

        info!("Collected {} key phrases", key_phrases.len());
        Ok(key_phrases)
    }
}

impl StyleWorker {
    async fn run(&self, style: ImageStyle, prompt: String) -> Result<String> {
        let prompt = prompt.as_str();
        with_retry(&self.policy, self.sleeper.as_ref(), style.label(), move |attempt| {
            self.attempt(style, prompt, attempt)
        })
        .await
    }

    /// Generate and persist one image; either step failing fails the attempt.
    async fn attempt(&self, style: ImageStyle, prompt: &str, attempt: u32) -> Result<String> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::Interrupted("generation pool closed".to_string()))?;

        info!(
            "[{}] Generating image (attempt {}/{})",
            style, attempt, self.policy.max_attempts
        );
        let image = self.image_gen.generate_image(prompt).await?;
        let url = self.persister.persist(&image.url).await?;
        info!("[{}] Image persisted at {}", style, url);
        Ok(url)
    }
}
