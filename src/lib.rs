//! ytmeta - turn YouTube auto-captions into short SEO metadata
//!
//! This library normalizes timed-caption documents into a plain transcript and asks an
//! LLM completion service for a title and description, recovering the result from
//! whatever shape the model actually answers in.

pub mod captions;
pub mod cli;
pub mod completion;
pub mod config;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod utils;

pub use captions::{CaptionNormalizer, CaptionSource};
pub use cli::{Cli, Commands, OutputFormat};
pub use completion::{CompletionClient, CompletionError, CompletionRequest};
pub use config::Config;
pub use metadata::{Metadata, MetadataExtractor, RetryPolicy};
pub use pipeline::{BatchStats, MetadataPipeline, VideoMetadata};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Failure stages of a single video run
#[derive(thiserror::Error, Debug)]
pub enum MetaError {
    #[error("Input unavailable: {0}")]
    InputUnavailable(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Could not parse completion: {0}")]
    ParseFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File operation failed: {0}")]
    FileError(String),
}
