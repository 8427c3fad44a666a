//! CDN integration for persisting generated images
//!
//! Uploads image bytes to S3-compatible storage (DigitalOcean Spaces) and
//! hands back public URLs that outlive the provider's temporary links.

pub mod client;
pub mod mime;
pub mod mock;

pub use client::CdnClient;
pub use mock::MockCdnClient;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CdnService: Send + Sync {
    /// Store `data` under `key` and return its public URL.
    async fn upload_file(&self, key: &str, data: &[u8], content_type: &str) -> Result<String>;
}
