use once_cell::sync::Lazy;
use regex::Regex;

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

static ENTITY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&[a-zA-Z]+;").expect("valid entity regex"));

const HEADER_TOKEN: &str = "WEBVTT";
const COMMENT_TOKEN: &str = "NOTE";
const CUE_SEPARATOR: &str = "-->";

/// Flattens a timed-caption document (WebVTT, or SRT-like cue blocks) into a transcript.
///
/// Timing lines, cue indices, the `WEBVTT` header block and `NOTE` lines are dropped,
/// inline tags and character entities are stripped, and a cue line that repeats the
/// line right before it is kept only once. Overlapping auto-caption windows repeat
/// text that way all the time.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptionNormalizer;

impl CaptionNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a raw caption document into a single space-joined transcript.
    ///
    /// Returns an empty string when nothing survives filtering; callers treat that
    /// as "no usable captions".
    pub fn normalize(&self, raw: &str) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut lines = raw.trim().lines().map(str::trim).peekable();

        // header metadata runs until the first blank line (or a cue, if malformed)
        if lines.next_if(|line| line.starts_with(HEADER_TOKEN)).is_some() {
            while lines
                .next_if(|line| !line.is_empty() && !line.contains(CUE_SEPARATOR))
                .is_some()
            {}
        }

        for line in lines {
            if Self::is_structural(line) {
                continue;
            }

            let cleaned = Self::clean_line(line);
            if cleaned.is_empty() {
                continue;
            }

            if parts.last() != Some(&cleaned) {
                parts.push(cleaned);
            }
        }

        let transcript = parts.join(" ");
        if transcript.is_empty() {
            tracing::warn!(
                input_len = raw.len(),
                "Caption document produced an empty transcript"
            );
        } else {
            tracing::debug!(
                lines = parts.len(),
                chars = transcript.chars().count(),
                "Normalized caption document"
            );
        }

        transcript
    }

    /// Lines that carry timing or structure rather than spoken text
    fn is_structural(line: &str) -> bool {
        line.is_empty()
            || line.contains(CUE_SEPARATOR)
            || line.starts_with(HEADER_TOKEN)
            || line.starts_with(COMMENT_TOKEN)
            || line.chars().all(|c| c.is_ascii_digit())
    }

    fn clean_line(line: &str) -> String {
        let without_tags = TAG_REGEX.replace_all(line, "");
        let without_entities = ENTITY_REGEX.replace_all(&without_tags, "");
        without_entities.trim().to_string()
    }
}
