pub mod client;
pub mod translate;
pub mod types;

pub use client::OpenAiHttpClient;
pub use translate::OpenAiTranslationClient;

#[cfg(test)]
pub(crate) mod test_support {
    use wiremock::matchers::{method, path};
    use wiremock::MockBuilder;

    pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

    pub fn post(endpoint: &str) -> MockBuilder {
        wiremock::Mock::given(method("POST")).and(path(endpoint))
    }

    pub fn chat_reply(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
    }
}
