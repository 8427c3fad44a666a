use super::client::AzureHttpClient;
use super::types::{DalleRequest, DalleResponse};
use crate::ai::{GeneratedImage, ImageGenerationService};
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

pub const IMAGE_SIZE: &str = "1024x1792";
pub const IMAGE_COUNT: u32 = 1;
pub const IMAGE_QUALITY: &str = "standard";
pub const IMAGE_STYLE: &str = "vivid";

/// Image generation through an Azure OpenAI DALL-E deployment.
pub struct AzureDalleClient {
    http: AzureHttpClient,
    url: String,
}

impl AzureDalleClient {
    /// `endpoint` is the full deployment URL ending in `/images/generations`.
    pub fn new_with_client(
        endpoint: String,
        api_version: String,
        api_key: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: AzureHttpClient::new_with_client(
                "api-key",
                api_key,
                Duration::from_secs(120),
                client,
            ),
            url: format!("{}?api-version={}", endpoint, api_version),
        }
    }
}

#[async_trait]
impl ImageGenerationService for AzureDalleClient {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let request = DalleRequest {
            prompt: prompt.to_string(),
            size: IMAGE_SIZE.to_string(),
            n: IMAGE_COUNT,
            quality: IMAGE_QUALITY.to_string(),
            style: IMAGE_STYLE.to_string(),
        };

        tracing::info!("Requesting DALL-E image, prompt: {}", prompt);

        let response: DalleResponse = self.http.post(&self.url, &request).await?;

        let image = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| Error::upstream(None, "No image data in DALL-E response"))?;

        tracing::info!("DALL-E image url: {}", image.url);
        tracing::info!("DALL-E revised_prompt: {}", image.revised_prompt);

        Ok(GeneratedImage {
            url: image.url,
            revised_prompt: image.revised_prompt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::azure::test_support;
    use wiremock::matchers::{body_partial_json, header, query_param};
    use wiremock::{MockServer, ResponseTemplate};

    fn make_client(server: &MockServer) -> AzureDalleClient {
        AzureDalleClient::new_with_client(
            format!("{}{}", server.uri(), test_support::DALLE_PATH),
            "2024-02-01".to_string(),
            "dalle-key".to_string(),
            reqwest::Client::new(),
        )
    }

    #[tokio::test]
    async fn test_generate_image_sends_fixed_parameters() {
        let server = MockServer::start().await;

        test_support::post(test_support::DALLE_PATH)
            .and(query_param("api-version", "2024-02-01"))
            .and(header("api-key", "dalle-key"))
            .and(body_partial_json(serde_json::json!({
                "prompt": "a quiet lake",
                "size": "1024x1792",
                "n": 1,
                "quality": "standard",
                "style": "vivid"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "created": 1700000000,
                "data": [{
                    "url": "https://provider.example.com/img/1.png",
                    "revised_prompt": "A calm lake at dawn"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let image = make_client(&server).generate_image("a quiet lake").await.unwrap();
        assert_eq!(image.url, "https://provider.example.com/img/1.png");
        assert_eq!(image.revised_prompt, "A calm lake at dawn");
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error_with_status() {
        let server = MockServer::start().await;

        test_support::post(test_support::DALLE_PATH)
            .respond_with(ResponseTemplate::new(429).set_body_string("too many requests"))
            .mount(&server)
            .await;

        let err = make_client(&server).generate_image("prompt").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Upstream {
                status: Some(429),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_data_array_is_upstream_error() {
        let server = MockServer::start().await;

        test_support::post(test_support::DALLE_PATH)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "error": "content filtered" })),
            )
            .mount(&server)
            .await;

        let err = make_client(&server).generate_image("prompt").await.unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_missing_revised_prompt_is_upstream_error() {
        let server = MockServer::start().await;

        test_support::post(test_support::DALLE_PATH)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "url": "https://provider.example.com/img/1.png" }]
            })))
            .mount(&server)
            .await;

        let err = make_client(&server).generate_image("prompt").await.unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_empty_body_and_empty_data_are_upstream_errors() {
        let server = MockServer::start().await;

        test_support::post(test_support::DALLE_PATH)
            .respond_with(ResponseTemplate::new(200))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        test_support::post(test_support::DALLE_PATH)
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })),
            )
            .mount(&server)
            .await;

        let client = make_client(&server);
        let first = client.generate_image("prompt").await.unwrap_err();
        assert!(first.to_string().contains("empty body"));
        let second = client.generate_image("prompt").await.unwrap_err();
        assert!(second.to_string().contains("No image data"));
    }
}
