use tracing::{error, info, warn};

use super::parser::parse_completion;
use super::prompt::build_prompt;
use super::retry::{RetryDecision, RetryPolicy};
use super::Metadata;
use crate::completion::{CompletionClient, CompletionError, CompletionRequest};
use crate::config::CompletionConfig;
use crate::MetaError;

/// Fixed sampling parameters sent with every attempt
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl From<&CompletionConfig> for GenerationSettings {
    fn from(config: &CompletionConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        (&CompletionConfig::default()).into()
    }
}

/// Generates title/description metadata for a transcript.
///
/// Holds the completion client; use one extractor per concurrently processed video.
pub struct MetadataExtractor {
    client: Box<dyn CompletionClient>,
    settings: GenerationSettings,
    policy: RetryPolicy,
}

impl MetadataExtractor {
    pub fn new(client: Box<dyn CompletionClient>, settings: GenerationSettings) -> Self {
        Self {
            client,
            settings,
            policy: RetryPolicy::default(),
        }
    }

    /// Replace the backoff schedule
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Generate metadata with up to `max_retries` attempts.
    ///
    /// Never fails loudly: every failure is logged and `None` comes back once the
    /// attempts are used up.
    pub async fn generate(&self, transcript: &str, max_retries: u32) -> Option<Metadata> {
        let prompt = build_prompt(transcript);

        for attempt in 0..max_retries {
            info!("Generating metadata (attempt {}/{})...", attempt + 1, max_retries);

            let failure = match self.attempt(&prompt).await {
                Ok(metadata) => {
                    info!(title = %metadata.title, "Metadata generated successfully");
                    return Some(metadata);
                }
                Err(failure) => failure,
            };

            match self.policy.decide(&failure, attempt, max_retries) {
                RetryDecision::Retry(delay) => {
                    warn!(attempt = attempt + 1, delay_secs = delay.as_secs_f64(), "{}", failure);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                RetryDecision::GiveUp => {
                    error!(attempts = attempt + 1, "Giving up on metadata generation: {}", failure);
                    return None;
                }
            }
        }

        None
    }

    /// One request/parse round trip, with the failure classified
    async fn attempt(&self, prompt: &str) -> Result<Metadata, MetaError> {
        let request = CompletionRequest {
            prompt: prompt.to_string(),
            model: self.settings.model.clone(),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let content = self.client.complete(&request).await.map_err(classify)?;

        parse_completion(&content).ok_or_else(|| {
            MetaError::ParseFailed(format!(
                "no title/description found in {} chars of output",
                content.chars().count()
            ))
        })
    }
}

fn classify(err: CompletionError) -> MetaError {
    match err {
        // an empty answer is an unusable answer, not a broken service
        CompletionError::EmptyResponse => MetaError::ParseFailed(err.to_string()),
        err if err.is_rate_limited() => match err.retry_after() {
            Some(secs) => MetaError::RateLimited(format!("{} (retry-after {}s)", err, secs)),
            None => MetaError::RateLimited(err.to_string()),
        },
        err => MetaError::GenerationFailed(err.to_string()),
    }
}
