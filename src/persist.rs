//! Re-hosting of provider images on the CDN
//!
//! Provider URLs expire after a short while, so every generated image is
//! downloaded and stored under a stable public URL before it is returned.

use crate::cdn::mime::ImageFormat;
use crate::cdn::CdnService;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

#[async_trait]
pub trait AssetPersister: Send + Sync {
    /// Copy the asset at `remote_url` into durable storage, returning its stable URL.
    async fn persist(&self, remote_url: &str) -> Result<String>;
}

pub struct RemoteAssetPersister {
    client: reqwest::Client,
    cdn: Arc<dyn CdnService>,
    timeout: Duration,
}

impl RemoteAssetPersister {
    pub fn new_with_client(cdn: Arc<dyn CdnService>, client: reqwest::Client) -> Self {
        Self {
            client,
            cdn,
            timeout: Duration::from_secs(60),
        }
    }

    async fn download(&self, remote_url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(remote_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::Persistence(format!("Failed to fetch {}: {}", remote_url, e)))?;

        if !response.status().is_success() {
            return Err(Error::Persistence(format!(
                "Fetching {} returned status {}",
                remote_url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Persistence(format!("Failed to read {}: {}", remote_url, e)))?;
        if bytes.is_empty() {
            return Err(Error::Persistence(format!(
                "Fetched an empty body from {}",
                remote_url
            )));
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl AssetPersister for RemoteAssetPersister {
    async fn persist(&self, remote_url: &str) -> Result<String> {
        let data = self.download(remote_url).await?;
        let image_format = ImageFormat::sniff(&data);

        let key = format!(
            "images/{}/{}.{}",
            Utc::now().format("%Y-%m-%d"),
            Uuid::new_v4(),
            image_format.extension()
        );

        let url = self.cdn.upload_file(&key, &data, image_format.content_type()).await?;
        tracing::info!("Persisted {} bytes to {}", data.len(), url);
        Ok(url)
    }
}

/// Persister double that maps `.../<name>` to `<base_url>/<name>` without I/O.
#[derive(Clone)]
pub struct MockAssetPersister {
    base_url: String,
    failures_remaining: Arc<Mutex<usize>>,
    persisted: Arc<Mutex<Vec<String>>>,
}

impl MockAssetPersister {
    pub fn new() -> Self {
        Self {
            base_url: "https://mock-cdn.example.com/images".to_string(),
            failures_remaining: Arc::new(Mutex::new(0)),
            persisted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Fail the next `count` calls.
    pub fn with_failures(self, count: usize) -> Self {
        *self.failures_remaining.lock().unwrap() = count;
        self
    }

    pub fn get_persisted(&self) -> Vec<String> {
        self.persisted.lock().unwrap().clone()
    }
}

impl Default for MockAssetPersister {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetPersister for MockAssetPersister {
    async fn persist(&self, remote_url: &str) -> Result<String> {
        {
            let mut remaining = self.failures_remaining.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::Persistence("Mock persistence failure".to_string()));
            }
        }

        self.persisted.lock().unwrap().push(remote_url.to_string());
        let name = remote_url.rsplit('/').next().unwrap_or(remote_url);
        Ok(format!("{}/{}", self.base_url, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdn::MockCdnClient;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PNG_BYTES: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[tokio::test]
    async fn test_persist_downloads_and_uploads() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/generated/1.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES.to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let cdn = MockCdnClient::new().with_base_url("https://cdn.test".to_string());
        let persister =
            RemoteAssetPersister::new_with_client(Arc::new(cdn.clone()), reqwest::Client::new());

        let url = persister
            .persist(&format!("{}/generated/1.png", server.uri()))
            .await
            .unwrap();

        assert!(url.starts_with("https://cdn.test/images/"));
        assert!(url.ends_with(".png"));

        let keys = cdn.get_keys();
        assert_eq!(keys.len(), 1);
        assert!(url.ends_with(&keys[0]));
        let stored = cdn.get_object(&keys[0]).unwrap();
        assert_eq!(stored.data, PNG_BYTES.to_vec());
        assert_eq!(stored.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_persist_fails_on_missing_remote_asset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let cdn = MockCdnClient::new();
        let persister =
            RemoteAssetPersister::new_with_client(Arc::new(cdn.clone()), reqwest::Client::new());

        let err = persister
            .persist(&format!("{}/gone.png", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
        assert_eq!(cdn.get_upload_count(), 0);
    }

    #[tokio::test]
    async fn test_persist_fails_on_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let persister = RemoteAssetPersister::new_with_client(
            Arc::new(MockCdnClient::new()),
            reqwest::Client::new(),
        );

        let err = persister
            .persist(&format!("{}/empty.png", server.uri()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty body"));
    }

    #[tokio::test]
    async fn test_persist_propagates_upload_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_BYTES.to_vec()))
            .mount(&server)
            .await;

        let persister = RemoteAssetPersister::new_with_client(
            Arc::new(MockCdnClient::new().with_failure(true)),
            reqwest::Client::new(),
        );

        let err = persister
            .persist(&format!("{}/1.png", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }

    #[tokio::test]
    async fn test_mock_persister_maps_names_and_fails_on_demand() {
        let persister = MockAssetPersister::new()
            .with_base_url("https://cdn.test".to_string())
            .with_failures(1);

        assert!(persister.persist("https://p/animated.png").await.is_err());
        let url = persister.persist("https://p/animated.png").await.unwrap();
        assert_eq!(url, "https://cdn.test/animated.png");
        assert_eq!(persister.get_persisted(), vec!["https://p/animated.png"]);
    }
}
