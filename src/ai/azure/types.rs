//! Azure Text Analytics and Azure OpenAI image payloads.

use serde::{Deserialize, Serialize};

/// Request body for the Text Analytics `keyPhrases` endpoint.
#[derive(Debug, Serialize)]
pub struct KeyPhraseRequest {
    pub documents: Vec<TextDocument>,
}

#[derive(Debug, Serialize)]
pub struct TextDocument {
    pub id: String,
    pub language: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct KeyPhraseResponse {
    pub documents: Vec<KeyPhraseDocument>,
    #[serde(default)]
    pub errors: Vec<DocumentError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPhraseDocument {
    pub id: String,
    pub key_phrases: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentError {
    pub id: String,
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Request body for an Azure OpenAI DALL-E deployment.
#[derive(Debug, Serialize)]
pub struct DalleRequest {
    pub prompt: String,
    pub size: String,
    pub n: u32,
    pub quality: String,
    pub style: String,
}

/// Both fields of each item are required; a payload without them is malformed.
#[derive(Debug, Deserialize)]
pub struct DalleResponse {
    pub data: Vec<DalleImage>,
}

#[derive(Debug, Deserialize)]
pub struct DalleImage {
    pub url: String,
    pub revised_prompt: String,
}
