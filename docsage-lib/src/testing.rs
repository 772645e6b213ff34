//! In-memory fakes for the external capabilities, shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::answer::Completer;
use crate::embed::{Embedder, Embedding};
use crate::fetch::Fetcher;
use crate::{Error, Result};

/// Embeds text as keyword occurrence counts, one dimension per keyword.
pub(crate) struct KeywordEmbedder {
    keywords: Vec<String>,
    fail_on: Option<String>,
}

impl KeywordEmbedder {
    pub(crate) fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            fail_on: None,
        }
    }

    /// Fail for any text containing `needle`.
    pub(crate) fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    pub(crate) fn dimension(&self) -> usize {
        self.keywords.len()
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        if self.fail_on.as_deref().is_some_and(|n| text.contains(n)) {
            return Err(Error::Embedding("rate limited".to_string()));
        }
        let lower = text.to_lowercase();
        Ok(self
            .keywords
            .iter()
            .map(|k| lower.matches(k.as_str()).count() as f32)
            .collect())
    }

    fn model_name(&self) -> &str {
        "keyword"
    }
}

/// Always fails.
pub(crate) struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Embedding> {
        Err(Error::Embedding("service unavailable".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// Serves fixed pages; unknown URLs fail like an unreachable host.
pub(crate) struct StaticFetcher {
    pages: HashMap<String, String>,
}

impl StaticFetcher {
    pub(crate) fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, text)| (url.to_string(), text.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Fetch(format!("{url}: connection refused")))
    }
}

/// Replies with a fixed answer (or fails) and records every call.
pub(crate) struct ScriptedCompleter {
    reply: Option<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedCompleter {
    pub(crate) fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(system_instruction, user_prompt)` pairs seen so far
    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completer for ScriptedCompleter {
    async fn complete(&self, system_instruction: &str, user_prompt: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_instruction.to_string(), user_prompt.to_string()));
        self.reply
            .clone()
            .ok_or_else(|| Error::Completion("HTTP 500: upstream error".to_string()))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
