use serde::{Deserialize, Serialize};

pub mod extractor;
pub mod parser;
pub mod prompt;
pub mod retry;

pub use extractor::{GenerationSettings, MetadataExtractor};
pub use parser::{parse_completion, MAX_TITLE_CHARS};
pub use prompt::{build_prompt, truncate_transcript};
pub use retry::{RetryDecision, RetryPolicy};

/// Generated video metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Title, at most 53 characters
    pub title: String,

    /// Description paragraphs joined by single spaces
    pub description: String,
}
