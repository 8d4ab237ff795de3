use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ytmeta",
    about = "ytmeta - Generate YouTube titles and descriptions from auto-captions",
    version,
    long_about = "Extracts English auto-captions from a YouTube video, cleans them into a transcript and asks an LLM (Groq by default) for an SEO title and description."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate metadata for a single video
    Generate {
        /// YouTube video URL
        #[arg(value_name = "URL")]
        url: String,

        /// Directory for the saved artifact (defaults to the configured output dir)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "markdown")]
        format: OutputFormat,

        /// Print only, do not write a file
        #[arg(long)]
        no_save: bool,

        /// API key for the completion service
        #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Generate metadata for every URL in a CSV file (column `url`)
    Batch {
        /// CSV file with a `url` header column
        #[arg(value_name = "CSV")]
        csv: PathBuf,

        /// Directory for the saved artifacts
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// API key for the completion service
        #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Print the cleaned transcript of a local caption file (.vtt / .srt)
    Normalize {
        /// Caption file to normalize
        #[arg(value_name = "CAPTION_FILE")]
        file: PathBuf,
    },

    /// Show or locate the configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown artifact (`# title` + description)
    Markdown,
    /// JSON with video id and timestamp
    Json,
    /// Plain text
    Text,
}

impl OutputFormat {
    /// File extension for saved artifacts
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}
