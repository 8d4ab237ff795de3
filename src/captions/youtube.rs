use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::process::Stdio;
use tokio::process::Command;

use super::{select_track, CaptionSource, CaptionTrack};
use crate::{MetaError, Result};

/// YouTube auto-caption source using yt-dlp
pub struct YoutubeCaptionSource {
    yt_dlp_path: String,
    language: String,
    client: Client,
}

impl YoutubeCaptionSource {
    pub fn new(yt_dlp_path: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
            language: language.into(),
            client: Client::new(),
        }
    }

    /// Get video information (including caption listings) without downloading media
    async fn get_video_info(&self, url: &str) -> Result<Value> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--skip-download", "--no-playlist", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| {
                format!(
                    "Failed to run {}. Is yt-dlp installed? https://github.com/yt-dlp/yt-dlp",
                    self.yt_dlp_path
                )
            })?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error);
        }

        let json_str = String::from_utf8(output.stdout)?;
        let info: Value = serde_json::from_str(&json_str)?;

        Ok(info)
    }

    /// Download the raw caption document behind a track URL
    async fn download_track(&self, track_url: &str) -> Result<String> {
        let response = self.client.get(track_url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to download captions: HTTP {}", response.status());
        }

        Ok(response.text().await?)
    }
}

/// Automatic-caption tracks for `language` from a yt-dlp info document
pub fn automatic_caption_tracks(info: &Value, language: &str) -> Result<Vec<CaptionTrack>> {
    let tracks = info
        .get("automatic_captions")
        .and_then(|captions| captions.get(language))
        .ok_or_else(|| {
            MetaError::InputUnavailable(format!("No '{}' auto-captions available", language))
        })?;

    let tracks: Vec<CaptionTrack> = serde_json::from_value(tracks.clone())?;
    Ok(tracks)
}

#[async_trait]
impl CaptionSource for YoutubeCaptionSource {
    async fn fetch_captions(&self, url: &str) -> Result<String> {
        tracing::info!("Extracting captions from YouTube...");
        let info = self.get_video_info(url).await?;

        let tracks = automatic_caption_tracks(&info, &self.language)?;
        let track_url = select_track(&tracks)
            .and_then(|track| track.url.as_deref())
            .ok_or_else(|| MetaError::InputUnavailable("No subtitle URL found".to_string()))?;

        let content = self.download_track(track_url).await?;
        tracing::info!(bytes = content.len(), "Captions downloaded");

        Ok(content)
    }

    fn source_name(&self) -> &'static str {
        "YouTube"
    }
}

impl Default for YoutubeCaptionSource {
    fn default() -> Self {
        Self::new("yt-dlp", "en")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_automatic_caption_tracks_reads_language() {
        let info = json!({
            "title": "Some video",
            "automatic_captions": {
                "en": [
                    {"ext": "json3", "url": "https://example.com/a.json3", "name": "English"},
                    {"ext": "vtt", "url": "https://example.com/a.vtt", "name": "English"}
                ],
                "de": [{"ext": "vtt", "url": "https://example.com/de.vtt"}]
            }
        });

        let tracks = automatic_caption_tracks(&info, "en").unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(
            select_track(&tracks).and_then(|t| t.url.as_deref()),
            Some("https://example.com/a.vtt")
        );
    }

    #[test]
    fn test_missing_language_is_input_unavailable() {
        let info = json!({ "automatic_captions": { "fr": [] } });

        let err = automatic_caption_tracks(&info, "en").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MetaError>(),
            Some(MetaError::InputUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_is_reported_by_fetch() {
        let source = YoutubeCaptionSource::new("/nonexistent/bin/yt-dlp", "en");

        let err = source
            .fetch_captions("https://youtu.be/dQw4w9WgXcQ")
            .await
            .unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("/nonexistent/bin/yt-dlp"));
        assert!(message.contains("Is yt-dlp installed?"));
    }

    #[test]
    fn test_missing_captions_key_is_input_unavailable() {
        let info = json!({ "title": "no captions here" });
        assert!(automatic_caption_tracks(&info, "en").is_err());
    }
}
