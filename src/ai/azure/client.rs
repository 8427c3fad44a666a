use crate::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Key-authenticated REST client shared by the Azure service modules.
///
/// Text Analytics authenticates with `Ocp-Apim-Subscription-Key`, Azure
/// OpenAI deployments with `api-key`; the header name is fixed per client.
pub struct AzureHttpClient {
    pub(crate) client: Client,
    key_header: &'static str,
    api_key: String,
    timeout: Duration,
}

impl AzureHttpClient {
    pub fn new_with_client(
        key_header: &'static str,
        api_key: String,
        timeout: Duration,
        client: Client,
    ) -> Self {
        Self {
            client,
            key_header,
            api_key,
            timeout,
        }
    }

    /// POST `request` as JSON to `url`; non-2xx, empty, and unparseable
    /// responses all surface as [`Error::Upstream`].
    pub async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        url: &str,
        request: &Req,
    ) -> Result<Resp> {
        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .header(self.key_header, &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Azure: {}", e);
                Error::upstream(e.status().map(|s| s.as_u16()), e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Azure API error (status {}): {}", status, error_text);
            return Err(Error::upstream(
                Some(status.as_u16()),
                format!("Azure API error (status {}): {}", status, error_text),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::upstream(None, format!("Failed to read Azure body: {}", e)))?;
        if body.trim().is_empty() {
            return Err(Error::upstream(
                Some(status.as_u16()),
                "Azure API returned an empty body",
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Azure response: {}\nBody: {}", e, body);
            Error::upstream(None, format!("Failed to parse Azure response: {}", e))
        })
    }
}
