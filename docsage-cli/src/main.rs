//! docsage CLI - answer questions from a scraped documentation set
//!
//! # Commands
//!
//! ```bash
//! # Load (or build) the knowledge base and serve POST /ask
//! docsage serve --addr 127.0.0.1:8000
//!
//! # One question from the terminal
//! docsage ask "What is Cursorless?"
//!
//! # Show the passages a question retrieves, without asking the model
//! docsage search "how do I select a line" -k 5
//!
//! # Rebuild from the seed list and overwrite the persisted artifacts
//! docsage build
//!
//! # Preview how a local text file would be chunked
//! docsage chunk page.txt --size 1000 --min-len 50
//! ```

mod server;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docsage_lib::{
    answer::{AnswerSynthesizer, OpenAiCompleter},
    chunk::{Chunker, FixedSizeChunker},
    config::Config,
    embed::{OpenAiEmbedder, Vectorizer},
    fetch::HttpFetcher,
    knowledge::{BuildReport, KnowledgeBase},
    search::RetrievalPipeline,
    service::{AskResponse, AskService},
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docsage")]
#[command(about = "Retrieval-augmented answers over a scraped document collection")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the question endpoint over HTTP
    Serve {
        /// Listen address (overrides server.addr)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Answer a single question
    Ask {
        question: String,

        /// Number of chunks used as context (overrides retrieval.top_k)
        #[arg(short)]
        k: Option<usize>,
    },

    /// Show the passages retrieved for a question
    Search {
        question: String,

        /// Number of passages to show (overrides retrieval.top_k)
        #[arg(short)]
        k: Option<usize>,
    },

    /// Rebuild the knowledge base from the seed list
    Build,

    /// Chunk a local text file and show which chunks would be admitted
    Chunk {
        input: PathBuf,

        /// Characters per chunk (overrides chunking.chunk_size)
        #[arg(long)]
        size: Option<usize>,

        /// Minimum trimmed length (overrides chunking.min_chunk_len)
        #[arg(long)]
        min_len: Option<usize>,
    },
}

fn vectorizer(config: &Config) -> Result<Vectorizer> {
    let api_key = config.api_key();
    if api_key.is_empty() {
        warn!(env = %config.api_key_env, "API key is not set, embedding calls will fail");
    }
    let embedder = OpenAiEmbedder::new(&config.embedding, api_key)?;
    Ok(Vectorizer::new(Arc::new(embedder), config.embedding.dimension))
}

fn fetcher(config: &Config) -> Result<HttpFetcher> {
    Ok(HttpFetcher::new(config.build.fetch_timeout_secs)?)
}

/// Load or build the knowledge base; it is read-only from here on.
async fn open_knowledge(config: &Config, vectorizer: &Vectorizer) -> Result<Arc<KnowledgeBase>> {
    let (kb, report) =
        KnowledgeBase::open_or_build(config, &fetcher(config)?, vectorizer).await?;

    if let Some(report) = report {
        print_report(&report);
    }
    if kb.is_empty() {
        warn!("knowledge base is empty, every question will be answered with an error");
    }
    Ok(Arc::new(kb))
}

fn ask_service(
    config: &Config,
    knowledge: Arc<KnowledgeBase>,
    vectorizer: Vectorizer,
    top_k: usize,
) -> Result<AskService> {
    let completer = OpenAiCompleter::new(&config.completion, config.api_key())?;
    Ok(AskService::new(
        RetrievalPipeline::new(knowledge, vectorizer),
        AnswerSynthesizer::new(Arc::new(completer)),
        top_k,
    ))
}

fn print_report(report: &BuildReport) {
    println!("URLs attempted:      {}", report.urls_attempted);
    println!("URLs failed:         {}", report.urls_failed);
    println!("Chunks scraped:      {}", report.chunks_scraped);
    println!("Chunks admitted:     {}", report.chunks_admitted);
    println!("Embedding failures:  {}", report.embedding_failures);
    println!("Vectors indexed:     {}", report.vectors_indexed);
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { addr } => {
            let vectorizer = vectorizer(&config)?;
            let knowledge = open_knowledge(&config, &vectorizer).await?;
            let service = ask_service(&config, knowledge, vectorizer, config.retrieval.top_k)?;

            let addr = addr.unwrap_or_else(|| config.server.addr.clone());
            server::serve(service, &addr).await?;
        }

        Commands::Ask { question, k } => {
            let vectorizer = vectorizer(&config)?;
            let knowledge = open_knowledge(&config, &vectorizer).await?;
            let top_k = k.unwrap_or(config.retrieval.top_k);
            let service = ask_service(&config, knowledge, vectorizer, top_k)?;

            match service.ask(&question).await {
                AskResponse::Answer { answer } => println!("{answer}"),
                AskResponse::Error { error } => anyhow::bail!(error),
            }
        }

        Commands::Search { question, k } => {
            let vectorizer = vectorizer(&config)?;
            let knowledge = open_knowledge(&config, &vectorizer).await?;
            let pipeline = RetrievalPipeline::new(knowledge, vectorizer);
            let k = k.unwrap_or(config.retrieval.top_k);

            println!("Searching: '{question}' (k={k})");
            let passages = pipeline.retrieve_passages(&question, k).await?;

            println!("\n=== Results ===\n");
            for (i, passage) in passages.iter().enumerate() {
                println!(
                    "#{} (position: {}, distance: {:.4})",
                    i + 1,
                    passage.position,
                    passage.distance
                );
                println!("---");
                let preview: String = passage.text.chars().take(300).collect();
                let ellipsis = if passage.text.chars().count() > 300 { "..." } else { "" };
                println!("{preview}{ellipsis}\n");
            }
        }

        Commands::Build => {
            let vectorizer = vectorizer(&config)?;
            let (kb, report) =
                KnowledgeBase::rebuild(&config, &fetcher(&config)?, &vectorizer).await?;
            print_report(&report);
            println!("Knowledge base holds {} chunks", kb.len());
        }

        Commands::Chunk {
            input,
            size,
            min_len,
        } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("cannot read {}", input.display()))?;
            let size = size.unwrap_or(config.chunking.chunk_size);
            let min_len = min_len.unwrap_or(config.chunking.min_chunk_len);

            let chunker = FixedSizeChunker::new(size)?;
            let chunks = chunker.chunk(&text, 0);
            let admitted = chunks.iter().filter(|c| c.is_admissible(min_len)).count();

            println!(
                "Chunked '{}' into {} chunks using {} strategy ({} admitted):\n",
                input.display(),
                chunks.len(),
                chunker.name(),
                admitted
            );
            for (i, chunk) in chunks.iter().enumerate() {
                let verdict = if chunk.is_admissible(min_len) { "admitted" } else { "too short" };
                println!(
                    "--- Chunk {} ({} chars, offset {}, {verdict}) ---",
                    i + 1,
                    chunk.text.chars().count(),
                    chunk.offset
                );
                // Show preview (first 200 chars)
                let preview: String = chunk.text.chars().take(200).collect();
                let ellipsis = if chunk.text.chars().count() > 200 { "..." } else { "" };
                println!("{preview}{ellipsis}\n");
            }
        }
    }

    Ok(())
}
