use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::captions::{CaptionNormalizer, CaptionSource};
use crate::config::Config;
use crate::metadata::{truncate_transcript, MetadataExtractor};
use crate::utils::{extract_video_id, validate_and_normalize_url};
use crate::Result;

pub mod batch;

pub use batch::{read_batch_urls, BatchStats};

/// Metadata for one processed video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: String,
    pub description: String,
}

/// Per-run knobs taken from the app config
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub max_transcript_chars: usize,
    pub max_retries: u32,
    pub batch_pause: Duration,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_transcript_chars: config.app.max_transcript_chars,
            max_retries: config.app.max_retries,
            batch_pause: Duration::from_secs(config.app.batch_pause_seconds),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        (&Config::default()).into()
    }
}

/// URL in, `{video_id, title, description}` out
pub struct MetadataPipeline {
    source: Box<dyn CaptionSource>,
    normalizer: CaptionNormalizer,
    extractor: MetadataExtractor,
    settings: PipelineSettings,
}

impl MetadataPipeline {
    pub fn new(
        source: Box<dyn CaptionSource>,
        extractor: MetadataExtractor,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            normalizer: CaptionNormalizer::new(),
            extractor,
            settings,
        }
    }

    /// Process a single video URL.
    ///
    /// Every stage failure is logged and turned into `None`; nothing here should take
    /// a batch down with it.
    pub async fn process(&self, url: &str) -> Option<VideoMetadata> {
        let url = match validate_and_normalize_url(url.trim()) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("{}", e);
                return None;
            }
        };

        let Some(video_id) = extract_video_id(&url) else {
            tracing::error!("Could not extract video ID from URL: {}", url);
            return None;
        };

        tracing::info!("Processing video ID: {}", video_id);

        let transcript = match self.transcript_for(&url).await {
            Ok(transcript) => transcript,
            Err(e) => {
                tracing::error!(video_id = %video_id, "Error extracting captions: {:#}", e);
                return None;
            }
        };

        let (transcript, truncated) =
            truncate_transcript(&transcript, self.settings.max_transcript_chars);
        if truncated {
            tracing::warn!(
                max_chars = self.settings.max_transcript_chars,
                "Transcript truncated to fit token limits"
            );
        }

        let metadata = self
            .extractor
            .generate(&transcript, self.settings.max_retries)
            .await?;

        Some(VideoMetadata {
            video_id,
            title: metadata.title,
            description: metadata.description,
        })
    }

    /// Fetch and normalize captions, treating an empty transcript as missing input
    async fn transcript_for(&self, url: &str) -> Result<String> {
        let raw = self
            .source
            .fetch_captions(url)
            .await
            .with_context(|| format!("{} caption source failed", self.source.source_name()))?;

        let transcript = self.normalizer.normalize(&raw);
        if transcript.is_empty() {
            return Err(crate::MetaError::InputUnavailable(
                "Failed to parse transcript".to_string(),
            )
            .into());
        }

        tracing::info!(chars = transcript.chars().count(), "Captions extracted successfully");
        Ok(transcript)
    }

    /// Process URLs strictly one after another, pausing between items.
    ///
    /// Counters live in the caller's `stats` so several runs can share or reset them.
    pub async fn process_batch<F>(
        &self,
        urls: &[String],
        stats: &mut BatchStats,
        mut on_result: F,
    ) where
        F: FnMut(&str, Option<&VideoMetadata>),
    {
        let urls: Vec<&str> = urls
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .collect();

        for (index, &url) in urls.iter().enumerate() {
            tracing::info!("Processing: {}", url);

            let result = self.process(url).await;
            stats.record(url, result.is_some());
            on_result(url, result.as_ref());

            match &result {
                Some(meta) => tracing::info!("Generated: {}", meta.title),
                None => tracing::warn!("Failed to process: {}", url),
            }

            let is_last = index + 1 == urls.len();
            if !is_last && !self.settings.batch_pause.is_zero() {
                tokio::time::sleep(self.settings.batch_pause).await;
            }
        }
    }
}
