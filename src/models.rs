//! Data models and structures
//!
//! Defines the request/response shapes of the generation API and the
//! process-wide configuration loaded at startup.

use serde::{Deserialize, Serialize};

/// JSON body of `POST /api/message/generate/{userId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImagesBody {
    pub input_message: String,
    pub mood: String,
    pub season: String,
    #[serde(default, alias = "keyWordMessage")]
    pub keywords: Vec<String>,
}

/// One user submission, immutable once received.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub user_id: u64,
    pub input_message: String,
    pub mood: String,
    pub season: String,
    pub keywords: Vec<String>,
}

impl GenerationRequest {
    pub fn from_body(user_id: u64, body: GenerateImagesBody) -> Self {
        Self {
            user_id,
            input_message: body.input_message,
            mood: body.mood,
            season: body.season,
            keywords: body.keywords,
        }
    }
}

/// Persisted image URLs, one per style in the fixed style order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub generated_image_urls: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    #[serde(rename = "selectedImageURL")]
    pub selected_image_url: String,
    pub send_phone_numbers: Vec<String>,
    pub address_names: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendRequest {
    pub send_phone_number: Option<String>,
    pub address_names: Vec<String>,
    pub message: Option<String>,
    pub image_url: Option<String>,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub translation_model: String,
    pub text_analytics_endpoint: String,
    pub text_analytics_key: String,
    pub dalle_endpoint: String,
    pub dalle_api_key: String,
    pub dalle_api_version: String,
    pub cdn_access_key_id: Option<String>,
    pub cdn_secret_access_key: Option<String>,
    pub cdn_endpoint: String,
    pub cdn_bucket: String,
    pub cdn_base_url: String,
    pub generation_concurrency: usize,
    pub dry_run: bool,
}

const DEFAULT_GENERATION_CONCURRENCY: usize = 12;

fn required(name: &str) -> crate::Result<String> {
    std::env::var(name).map_err(|_| crate::Error::Config(format!("{} not set", name)))
}

fn parse_flag(value: Option<String>) -> bool {
    value
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn parse_concurrency(value: Option<String>) -> crate::Result<usize> {
    match value {
        None => Ok(DEFAULT_GENERATION_CONCURRENCY),
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(crate::Error::Config(format!(
                "GENERATION_CONCURRENCY must be a positive integer, got '{}'",
                raw
            ))),
        },
    }
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let dry_run = parse_flag(std::env::var("DRY_RUN").ok());

        let cdn_access_key_id = std::env::var("CDN_ACCESS_KEY_ID").ok();
        let cdn_secret_access_key = std::env::var("CDN_SECRET_ACCESS_KEY").ok();
        if !dry_run && (cdn_access_key_id.is_none() || cdn_secret_access_key.is_none()) {
            return Err(crate::Error::Config(
                "CDN_ACCESS_KEY_ID and CDN_SECRET_ACCESS_KEY are required unless DRY_RUN is set"
                    .to_string(),
            ));
        }

        Ok(Self {
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            translation_model: std::env::var("TRANSLATION_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            text_analytics_endpoint: required("TEXT_ANALYTICS_ENDPOINT")?,
            text_analytics_key: required("TEXT_ANALYTICS_KEY")?,
            dalle_endpoint: required("DALLE_ENDPOINT")?,
            dalle_api_key: required("DALLE_API_KEY")?,
            dalle_api_version: std::env::var("DALLE_API_VERSION")
                .unwrap_or_else(|_| "2024-02-01".to_string()),
            cdn_access_key_id,
            cdn_secret_access_key,
            cdn_endpoint: std::env::var("CDN_ENDPOINT")
                .unwrap_or_else(|_| "https://nyc3.digitaloceanspaces.com".to_string()),
            cdn_bucket: std::env::var("CDN_BUCKET").unwrap_or_else(|_| "sparkle".to_string()),
            cdn_base_url: std::env::var("CDN_BASE_URL")
                .unwrap_or_else(|_| "https://cdn.sparkle.example".to_string()),
            generation_concurrency: parse_concurrency(
                std::env::var("GENERATION_CONCURRENCY").ok(),
            )?,
            dry_run,
        })
    }
}
