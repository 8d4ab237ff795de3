use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static VIDEO_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Za-z_-]{11}$").expect("valid video id regex"));

/// Path prefixes that are followed directly by a video ID
const ID_PATH_PREFIXES: &[&str] = &["embed", "v", "shorts", "live"];

/// Validate a URL and return normalized version
pub fn validate_and_normalize_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed.to_string())
}

/// Extract the 11-character YouTube video ID from the usual URL shapes
/// (`watch?v=`, `youtu.be/`, `embed/`, `v/`, `shorts/`, `live/`).
pub fn extract_video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.trim_start_matches("www.").trim_start_matches("m.");

    let candidate = if host == "youtu.be" {
        parsed.path_segments()?.next().map(str::to_string)
    } else if host.ends_with("youtube.com") || host.ends_with("youtube-nocookie.com") {
        let from_query = parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned());

        from_query.or_else(|| {
            let segments: Vec<&str> = parsed.path_segments()?.collect();
            segments
                .windows(2)
                .find(|pair| ID_PATH_PREFIXES.contains(&pair[0]))
                .map(|pair| pair[1].to_string())
        })
    } else {
        None
    };

    candidate.filter(|id| VIDEO_ID_REGEX.is_match(id))
}

/// Sanitize filename for safe filesystem usage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' => c,
            _ => '_',
        })
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}

/// Check if the current environment has required tools
pub async fn check_dependencies(yt_dlp_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(yt_dlp_path).await {
        missing.push(format!(
            "{} - required for YouTube caption extraction",
            yt_dlp_path
        ));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
