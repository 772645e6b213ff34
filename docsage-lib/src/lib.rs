//! docsage - retrieval-augmented answers over a scraped document collection
//!
//! # Architecture
//!
//! ```text
//! Seed URLs -> Fetcher -> Chunker -> Vectorizer -> KnowledgeBase -> disk
//!                                                        |
//! Question -> Vectorizer -> RetrievalPipeline <----------+
//!                                  |
//!                         AnswerSynthesizer -> answer
//! ```
//!
//! The knowledge base is built (or loaded) once at startup and then shared
//! read-only, so any number of questions can be answered concurrently.
//!
//! # Example
//!
//! ```ignore
//! use docsage_lib::{config::Config, knowledge::KnowledgeBase, service::AskService};
//!
//! let config = Config::load(None)?;
//! let (kb, _report) = KnowledgeBase::open_or_build(&config, &fetcher, &vectorizer).await?;
//!
//! let retrieval = RetrievalPipeline::new(Arc::new(kb), vectorizer);
//! let service = AskService::new(retrieval, synthesizer, config.retrieval.top_k);
//! let response = service.ask("What is Cursorless?").await;
//! ```

pub mod answer;
pub mod chunk;
pub mod config;
pub mod embed;
pub mod error;
pub mod fetch;
pub mod index;
pub mod knowledge;
mod openai;
pub mod search;
pub mod service;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
