use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod local;
pub mod normalizer;
pub mod youtube;

pub use local::LocalCaptionSource;
pub use normalizer::CaptionNormalizer;
pub use youtube::YoutubeCaptionSource;

use crate::Result;

/// One downloadable caption track as listed by yt-dlp
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptionTrack {
    /// File extension / cue format (vtt, srv3, json3, ...)
    pub ext: Option<String>,

    /// Download URL of the track
    pub url: Option<String>,

    /// Human readable track name
    pub name: Option<String>,
}

/// Pick the preferred track: the first WebVTT one, otherwise whatever comes first.
pub fn select_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    tracks
        .iter()
        .find(|track| track.ext.as_deref() == Some("vtt") && track.url.is_some())
        .or_else(|| tracks.first())
        .filter(|track| track.url.is_some())
}

/// Trait for anything that can hand back a raw caption document
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch the raw timed-text document for the given input
    async fn fetch_captions(&self, input: &str) -> Result<String>;

    /// Name of this source for logs
    fn source_name(&self) -> &'static str;
}
