use async_trait::async_trait;
use std::path::Path;

use super::CaptionSource;
use crate::{MetaError, Result};

/// Reads caption documents (.vtt / .srt) from disk
pub struct LocalCaptionSource;

impl LocalCaptionSource {
    pub fn new() -> Self {
        Self
    }

    fn validate_file(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(MetaError::InputUnavailable(format!(
                "File does not exist: {}",
                path.display()
            ))
            .into());
        }

        if !path.is_file() {
            return Err(MetaError::InputUnavailable(format!(
                "Path is not a file: {}",
                path.display()
            ))
            .into());
        }

        Ok(())
    }
}

#[async_trait]
impl CaptionSource for LocalCaptionSource {
    async fn fetch_captions(&self, input: &str) -> Result<String> {
        let path = Path::new(input);
        Self::validate_file(path)?;

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| MetaError::FileError(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "Read local caption file");
        Ok(content)
    }

    fn source_name(&self) -> &'static str {
        "Local file"
    }
}

impl Default for LocalCaptionSource {
    fn default() -> Self {
        Self::new()
    }
}
