use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::EmbeddingConfig;
use crate::embed::{Embedder, Embedding};
use crate::openai::OpenAiClient;
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embedder backed by the OpenAI embeddings API (or any compatible server).
///
/// `text-embedding-3-*` models are asked for the configured dimension
/// explicitly; other models return their native size.
pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig, api_key: String) -> Result<Self> {
        let client = OpenAiClient::new(&config.base_url, api_key, config.timeout_secs)
            .map_err(Error::Embedding)?;

        Ok(Self {
            client,
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }

    fn request_body(&self, text: &str) -> serde_json::Value {
        let mut body = json!({
            "model": self.model,
            "input": text,
        });
        if self.model.contains("text-embedding-3") {
            body["dimensions"] = json!(self.dimension);
        }
        body
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        let response: EmbeddingResponse = self
            .client
            .post("/embeddings", &self.request_body(text))
            .await
            .map_err(Error::Embedding)?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::Embedding("model returned no embeddings".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_includes_dimensions_for_v3_models() {
        let embedder = OpenAiEmbedder::new(&EmbeddingConfig::default(), "key".into()).unwrap();
        let body = embedder.request_body("hello");
        assert_eq!(body["model"], "text-embedding-3-small");
        assert_eq!(body["input"], "hello");
        assert_eq!(body["dimensions"], 1536);
    }

    #[test]
    fn test_request_body_omits_dimensions_for_legacy_models() {
        let config = EmbeddingConfig {
            model: "text-embedding-ada-002".to_string(),
            ..EmbeddingConfig::default()
        };
        let embedder = OpenAiEmbedder::new(&config, "key".into()).unwrap();
        assert!(embedder.request_body("hello").get("dimensions").is_none());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_network() {
        let embedder = OpenAiEmbedder::new(&EmbeddingConfig::default(), String::new()).unwrap();
        let err = embedder.embed("hello").await.unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }
}
