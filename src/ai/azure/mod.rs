pub mod client;
pub mod dalle;
pub mod key_phrases;
pub mod types;

pub use client::AzureHttpClient;
pub use dalle::AzureDalleClient;
pub use key_phrases::AzureKeyPhraseClient;
