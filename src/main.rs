use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ytmeta::captions::{CaptionNormalizer, CaptionSource, LocalCaptionSource, YoutubeCaptionSource};
use ytmeta::completion::GroqClient;
use ytmeta::metadata::{GenerationSettings, MetadataExtractor};
use ytmeta::pipeline::{read_batch_urls, BatchStats, PipelineSettings};
use ytmeta::{output, utils, Cli, Commands, Config, MetadataPipeline, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let success = match cli.command {
        Commands::Generate {
            url,
            output_dir,
            format,
            no_save,
            api_key,
        } => {
            let config = load_config(api_key).await?;
            let pipeline = build_pipeline(&config).await?;

            let spinner = spinner(cli.quiet, "Generating metadata...")?;
            let result = pipeline.process(&url).await;
            spinner.finish_and_clear();

            match result {
                Some(meta) => {
                    output::print_to_console(&meta, &format)?;
                    if !no_save {
                        let dir = output_dir.unwrap_or_else(|| config.output_dir());
                        let path = output::save_to_file(&meta, &dir, &format)?;
                        println!("\nSaved to {}", path.display());
                    }
                    true
                }
                None => {
                    eprintln!("Failed to process video");
                    false
                }
            }
        }
        Commands::Batch {
            csv,
            output_dir,
            api_key,
        } => {
            let config = load_config(api_key).await?;
            let urls = read_batch_urls(&csv)?;
            let pipeline = build_pipeline(&config).await?;
            let dir = output_dir.unwrap_or_else(|| config.output_dir());

            let mut stats = BatchStats::new();
            pipeline
                .process_batch(&urls, &mut stats, |url, meta| {
                    if let Some(meta) = meta {
                        if let Err(e) = output::save_to_file(meta, &dir, &OutputFormat::Markdown) {
                            tracing::error!("Error saving metadata for {}: {:#}", url, e);
                        }
                    }
                })
                .await;

            println!(
                "Processed {} videos: {} succeeded, {} failed",
                stats.processed, stats.succeeded, stats.failed
            );
            for url in &stats.failed_urls {
                println!("  failed: {}", url);
            }
            stats.failed == 0
        }
        Commands::Normalize { file } => normalize_file(file).await?,
        Commands::Config { show } => {
            let config = Config::load().await?;
            if show {
                config.display();
            } else {
                println!(
                    "Edit the configuration file to change settings, or run `ytmeta config --show`."
                );
            }
            true
        }
    };

    if !success {
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose { "ytmeta=debug" } else { "ytmeta=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn load_config(api_key: Option<String>) -> Result<Config> {
    let mut config = Config::load().await?;
    config.apply_env(api_key);
    Ok(config)
}

async fn build_pipeline(config: &Config) -> Result<MetadataPipeline> {
    // Check for yt-dlp up front (non-fatal, it may still resolve at run time)
    let missing_deps = utils::check_dependencies(&config.app.yt_dlp_path).await;
    for dep in missing_deps {
        tracing::warn!("Missing dependency: {}", dep);
    }

    let client = GroqClient::new(&config.completion)?;
    let extractor = MetadataExtractor::new(
        Box::new(client),
        GenerationSettings::from(&config.completion),
    );
    let source = YoutubeCaptionSource::new(
        config.app.yt_dlp_path.clone(),
        config.app.caption_language.clone(),
    );

    Ok(MetadataPipeline::new(
        Box::new(source),
        extractor,
        PipelineSettings::from(config),
    ))
}

async fn normalize_file(file: PathBuf) -> Result<bool> {
    let raw = LocalCaptionSource::new()
        .fetch_captions(&file.to_string_lossy())
        .await?;

    let transcript = CaptionNormalizer::new().normalize(&raw);
    if transcript.is_empty() {
        eprintln!("No transcript text found in {}", file.display());
        return Ok(false);
    }

    println!("{}", transcript);
    Ok(true)
}

fn spinner(quiet: bool, message: &'static str) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    progress.set_message(message);
    progress.enable_steady_tick(Duration::from_millis(120));
    Ok(progress)
}
