use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::pipeline::VideoMetadata;
use crate::utils::sanitize_filename;

/// JSON shape written for `--format json`
#[derive(Debug, Serialize)]
struct OutputRecord<'a> {
    video_id: &'a str,
    title: &'a str,
    description: &'a str,
    generated_at: DateTime<Utc>,
}

pub fn format_as_markdown(meta: &VideoMetadata) -> String {
    format!("# {}\n\n{}\n\n", meta.title, meta.description)
}

pub fn format_as_json(meta: &VideoMetadata) -> Result<String> {
    let record = OutputRecord {
        video_id: &meta.video_id,
        title: &meta.title,
        description: &meta.description,
        generated_at: Utc::now(),
    };

    serde_json::to_string_pretty(&record).context("Failed to serialize metadata")
}

pub fn format_as_text(meta: &VideoMetadata) -> String {
    format!("Title: {}\n\nDescription: {}\n", meta.title, meta.description)
}

fn render(meta: &VideoMetadata, format: &OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Markdown => format_as_markdown(meta),
        OutputFormat::Json => format_as_json(meta)?,
        OutputFormat::Text => format_as_text(meta),
    })
}

/// Write `<video_id>.<ext>` into `dir` and return its path
pub fn save_to_file(meta: &VideoMetadata, dir: &Path, format: &OutputFormat) -> Result<PathBuf> {
    let content = render(meta, format)?;

    fs_err::create_dir_all(dir)?;
    let path = dir.join(format!(
        "{}.{}",
        sanitize_filename(&meta.video_id),
        format.extension()
    ));

    fs_err::write(&path, content)?;
    tracing::info!("Saved to {}", path.display());
    Ok(path)
}

/// Print metadata to stdout
pub fn print_to_console(meta: &VideoMetadata, format: &OutputFormat) -> Result<()> {
    let content = render(meta, format)?;
    println!("{}", content.trim_end());
    Ok(())
}
