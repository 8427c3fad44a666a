use super::CdnService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// In-memory bucket used for dry runs and tests.
#[derive(Clone)]
pub struct MockCdnClient {
    base_url: String,
    objects: Arc<Mutex<BTreeMap<String, StoredObject>>>,
    attempts: Arc<Mutex<usize>>,
    should_fail: bool,
}

impl MockCdnClient {
    pub fn new() -> Self {
        Self {
            base_url: "https://mock-cdn.example.com".to_string(),
            objects: Arc::new(Mutex::new(BTreeMap::new())),
            attempts: Arc::new(Mutex::new(0)),
            should_fail: false,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Reject every upload with a persistence error.
    pub fn with_failure(mut self, should_fail: bool) -> Self {
        self.should_fail = should_fail;
        self
    }

    /// Number of upload calls, failed ones included.
    pub fn get_upload_count(&self) -> usize {
        *self.attempts.lock().unwrap()
    }

    pub fn get_object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn get_keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

impl Default for MockCdnClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdnService for MockCdnClient {
    async fn upload_file(&self, key: &str, data: &[u8], content_type: &str) -> Result<String> {
        *self.attempts.lock().unwrap() += 1;
        if self.should_fail {
            return Err(Error::Persistence(format!("Mock upload of {} rejected", key)));
        }

        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data: data.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(format!("{}/{}", self.base_url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_stores_object_and_returns_public_url() {
        let cdn = MockCdnClient::new().with_base_url("https://cdn.test/".to_string());

        let url = cdn
            .upload_file("images/a.png", b"png-bytes", "image/png")
            .await
            .unwrap();

        assert_eq!(url, "https://cdn.test/images/a.png");
        assert_eq!(cdn.get_keys(), vec!["images/a.png".to_string()]);
        assert_eq!(
            cdn.get_object("images/a.png"),
            Some(StoredObject {
                data: b"png-bytes".to_vec(),
                content_type: "image/png".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_failing_upload_is_counted_but_not_stored() {
        let cdn = MockCdnClient::new().with_failure(true);

        let err = cdn
            .upload_file("images/a.png", b"data", "image/png")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Persistence(_)));
        assert_eq!(cdn.get_upload_count(), 1);
        assert!(cdn.get_keys().is_empty());
    }
}
