use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::answer::Completer;
use crate::config::CompletionConfig;
use crate::openai::OpenAiClient;
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Completer backed by the OpenAI chat completions API (or any compatible server).
pub struct OpenAiCompleter {
    client: OpenAiClient,
    model: String,
}

impl OpenAiCompleter {
    pub fn new(config: &CompletionConfig, api_key: String) -> Result<Self> {
        let client = OpenAiClient::new(&config.base_url, api_key, config.timeout_secs)
            .map_err(Error::Completion)?;

        Ok(Self {
            client,
            model: config.model.clone(),
        })
    }

    fn request_body(&self, system_instruction: &str, user_prompt: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_instruction },
                { "role": "user", "content": user_prompt },
            ],
        })
    }
}

#[async_trait]
impl Completer for OpenAiCompleter {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system_instruction: &str, user_prompt: &str) -> Result<String> {
        let response: ChatResponse = self
            .client
            .post("/chat/completions", &self.request_body(system_instruction, user_prompt))
            .await
            .map_err(Error::Completion)?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Completion("model returned no content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let completer = OpenAiCompleter::new(&CompletionConfig::default(), "key".into()).unwrap();
        let body = completer.request_body("sys", "user");

        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "sys");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "user");
    }

    #[test]
    fn test_response_shape() {
        let raw = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"hi"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("hi"));
    }
}
