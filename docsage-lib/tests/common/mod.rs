//! Fakes for the external capabilities used by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use docsage_lib::answer::Completer;
use docsage_lib::embed::{Embedder, Embedding};
use docsage_lib::fetch::Fetcher;
use docsage_lib::{Error, Result};

/// Lowercase letter histogram: 26 dimensions, deterministic.
pub struct LetterEmbedder;

pub const LETTER_DIMENSION: usize = 26;

#[async_trait]
impl Embedder for LetterEmbedder {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let mut counts = vec![0.0; LETTER_DIMENSION];
        for c in text.chars().filter(char::is_ascii_alphabetic) {
            counts[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        Ok(counts)
    }

    fn model_name(&self) -> &str {
        "letters"
    }
}

pub struct DownEmbedder;

#[async_trait]
impl Embedder for DownEmbedder {
    async fn embed(&self, _text: &str) -> Result<Embedding> {
        Err(Error::Embedding("HTTP 503: service unavailable".to_string()))
    }

    fn model_name(&self) -> &str {
        "down"
    }
}

pub struct PageFetcher {
    pages: HashMap<String, String>,
}

impl PageFetcher {
    pub fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(u, t)| (u.to_string(), t.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl Fetcher for PageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Fetch(format!("{url}: HTTP 404")))
    }
}

/// Answers by quoting the context block it was given.
#[derive(Default)]
pub struct QuotingCompleter {
    prompts: Mutex<Vec<String>>,
}

impl QuotingCompleter {
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

/// The text between the two `---` fences of a grounded prompt.
pub fn context_of(prompt: &str) -> &str {
    let start = prompt.find("---\n").map(|i| i + 4).unwrap_or(0);
    let end = prompt.rfind("\n---").unwrap_or(prompt.len());
    &prompt[start..end]
}

#[async_trait]
impl Completer for QuotingCompleter {
    async fn complete(&self, _system_instruction: &str, user_prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(user_prompt.to_string());
        Ok(format!("According to the docs: {}", context_of(user_prompt)))
    }

    fn model_name(&self) -> &str {
        "quoting"
    }
}
