use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::MetaError;

/// Environment variable that overrides the configured API key
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Completion service configuration
    pub completion: CompletionConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// OpenAI-compatible chat completions endpoint
    pub endpoint: String,

    /// API key (GROQ_API_KEY takes precedence)
    pub api_key: Option<String>,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum output tokens
    pub max_tokens: u32,

    /// Request timeout
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where markdown artifacts are written (current directory if unset)
    pub output_dir: Option<PathBuf>,

    /// Transcripts longer than this are cut before prompting
    pub max_transcript_chars: usize,

    /// Generation attempts per video
    pub max_retries: u32,

    /// Pause between videos in batch mode
    pub batch_pause_seconds: u64,

    /// yt-dlp executable
    pub yt_dlp_path: String,

    /// Auto-caption language to request
    pub caption_language: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            api_key: None,
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.7,
            max_tokens: 300,
            timeout_seconds: 60,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            max_transcript_chars: 8000,
            max_retries: 3,
            batch_pause_seconds: 2,
            yt_dlp_path: "yt-dlp".to_string(),
            caption_language: "en".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            let config = Self::default();
            config.save().await?;
            config
        };

        config.apply_env(std::env::var(API_KEY_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without touching the environment
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        serde_yaml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("ytmeta").join("config.yaml"))
    }

    /// An API key from the environment wins over the file
    pub fn apply_env(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|key| !key.trim().is_empty()) {
            self.completion.api_key = Some(key);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), MetaError> {
        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(MetaError::Config(format!(
                "temperature must be between 0 and 2, got {}",
                self.completion.temperature
            )));
        }

        if self.completion.max_tokens == 0 {
            return Err(MetaError::Config("max_tokens must be positive".to_string()));
        }

        if self.app.max_retries == 0 {
            return Err(MetaError::Config("max_retries must be at least 1".to_string()));
        }

        if self.app.max_transcript_chars == 0 {
            return Err(MetaError::Config(
                "max_transcript_chars must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Output directory, falling back to the current directory
    pub fn output_dir(&self) -> PathBuf {
        self.app
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Endpoint: {}", self.completion.endpoint);
        println!("  Model: {}", self.completion.model);
        println!("  API Key: {}", mask_key(self.completion.api_key.as_deref()));
        println!("  Temperature: {}", self.completion.temperature);
        println!("  Max Tokens: {}", self.completion.max_tokens);
        println!("  Max Retries: {}", self.app.max_retries);
        println!("  Max Transcript Chars: {}", self.app.max_transcript_chars);
        println!("  Output Dir: {}", self.output_dir().display());
        println!(
            "  Config File: {}",
            Self::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        );
    }
}

fn mask_key(key: Option<&str>) -> String {
    match key {
        Some(key) if key.chars().count() > 8 => {
            let tail: String = key
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("****{}", tail)
        }
        Some(_) => "****".to_string(),
        None => "(not set)".to_string(),
    }
}
