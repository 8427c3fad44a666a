use super::CdnService;
use crate::models::Config;
use crate::{Error, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client as S3Client;

/// Persisted images are content-addressed by a fresh UUID and never rewritten.
const IMAGE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Public-read image bucket on S3-compatible storage.
pub struct CdnClient {
    s3: S3Client,
    bucket: String,
    public_base_url: String,
}

impl CdnClient {
    pub async fn from_config(config: &Config) -> Result<Self> {
        let access_key_id = config.cdn_access_key_id.clone().ok_or_else(|| {
            Error::Config("CDN_ACCESS_KEY_ID is required outside dry runs".to_string())
        })?;
        let secret_access_key = config.cdn_secret_access_key.clone().ok_or_else(|| {
            Error::Config("CDN_SECRET_ACCESS_KEY is required outside dry runs".to_string())
        })?;

        let credentials = Credentials::new(access_key_id, secret_access_key, None, None, "sparkle-cdn");
        Ok(Self::new(credentials, &config.cdn_endpoint, &config.cdn_bucket, &config.cdn_base_url).await)
    }

    pub async fn new(
        credentials: Credentials,
        endpoint: &str,
        bucket: &str,
        public_base_url: &str,
    ) -> Self {
        // Spaces ignores the region but the SDK refuses to sign without one
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new("us-east-1"))
            .endpoint_url(endpoint)
            .load()
            .await;

        tracing::info!("CDN bucket '{}' at {}", bucket, endpoint);

        Self {
            s3: S3Client::new(&sdk_config),
            bucket: bucket.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key.trim_start_matches('/'))
    }
}

#[async_trait]
impl CdnService for CdnClient {
    async fn upload_file(&self, key: &str, data: &[u8], content_type: &str) -> Result<String> {
        self.s3
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .content_length(data.len() as i64)
            .cache_control(IMAGE_CACHE_CONTROL)
            .acl(ObjectCannedAcl::PublicRead)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(|e| {
                Error::Persistence(format!(
                    "Upload of {} to bucket '{}' failed: {}",
                    key,
                    self.bucket,
                    DisplayErrorContext(&e)
                ))
            })?;

        tracing::debug!("Uploaded {} ({}, {} bytes)", key, content_type, data.len());
        Ok(self.public_url(key))
    }
}
