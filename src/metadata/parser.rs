//! Recovery of `{title, description}` from free-form completions.
//!
//! Models rarely answer in exactly the requested `TITLE:` / `DESCRIPTION:` shape, so the
//! parser runs an ordered ladder of rules. The first rule that recognizes its format
//! produces the draft; sentence splitting then fills whatever is still missing.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Metadata;

/// Longest title we hand back
pub const MAX_TITLE_CHARS: usize = 53;

const TRUNCATED_TITLE_CHARS: usize = 50;
const ELLIPSIS: &str = "...";

static BOLD_TITLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\*\*Title:\*\*\s*([^\n]+)").expect("valid title regex"));

static BOLD_DESCRIPTION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\*\*Description:\*\*\s*([^*]+)").expect("valid description regex")
});

/// Partial result of one parse rule
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub title: String,
    pub description: String,
}

/// One rung of the fallback ladder. `apply` returns `None` when the text is not in
/// this rule's format.
pub struct ParseRule {
    pub name: &'static str,
    pub apply: fn(&str) -> Option<Draft>,
}

/// Rules in priority order
pub const RULES: &[ParseRule] = &[
    ParseRule {
        name: "labeled-lines",
        apply: labeled_lines,
    },
    ParseRule {
        name: "bold-labels",
        apply: bold_labels,
    },
    ParseRule {
        name: "first-line",
        apply: first_line,
    },
];

/// Parse a raw completion into validated metadata.
///
/// Returns `None` when either field is still empty after every rule has had its turn.
pub fn parse_completion(content: &str) -> Option<Metadata> {
    let text = content.trim();

    let mut draft = RULES
        .iter()
        .find_map(|rule| {
            (rule.apply)(text).map(|draft| {
                tracing::debug!(rule = rule.name, "Completion matched parse rule");
                draft
            })
        })
        .unwrap_or_default();

    draft.title = clean_title(&draft.title);

    if draft.title.is_empty() || draft.description.is_empty() {
        fill_from_sentences(text, &mut draft);
        draft.title = clean_title(&draft.title);
    }

    if draft.title.is_empty() || draft.description.is_empty() {
        return None;
    }

    Some(Metadata {
        title: draft.title,
        description: draft.description,
    })
}

/// `TITLE: ...` / `DESCRIPTION: ...` lines; everything after the description label is
/// description. Labels wrapped in emphasis (`**Title:**`) are accepted too.
pub fn labeled_lines(text: &str) -> Option<Draft> {
    if !text.to_ascii_uppercase().contains("TITLE:") {
        return None;
    }

    let mut title = String::new();
    let mut description_lines: Vec<&str> = Vec::new();
    let mut collecting = false;

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let unwrapped = line.trim_start_matches('*');

        if let Some(rest) = strip_label(unwrapped, "TITLE:") {
            title = strip_quotes(strip_emphasis(rest)).to_string();
        } else if let Some(rest) = strip_label(unwrapped, "DESCRIPTION:") {
            collecting = true;
            let rest = strip_emphasis(rest);
            if !rest.is_empty() {
                description_lines.push(rest);
            }
        } else if collecting {
            description_lines.push(line);
        }
    }

    Some(Draft {
        title,
        description: description_lines.join(" ").trim().to_string(),
    })
}

/// `**Title:** ...` / `**Description:** ...` markdown labels
pub fn bold_labels(text: &str) -> Option<Draft> {
    let lower = text.to_lowercase();
    if !lower.contains("**title:**") && !lower.contains("**description:**") {
        return None;
    }

    let title = BOLD_TITLE_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let description = BOLD_DESCRIPTION_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    Some(Draft { title, description })
}

/// A `**emphasized**` or short first line is the title, the rest is description
pub fn first_line(text: &str) -> Option<Draft> {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or("").trim();

    let rest = || {
        lines
            .clone()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    };

    if first.len() >= 4 && first.starts_with("**") && first.ends_with("**") {
        Some(Draft {
            title: first.trim_matches('*').trim().to_string(),
            description: rest(),
        })
    } else if first.chars().count() <= MAX_TITLE_CHARS {
        Some(Draft {
            title: first.to_string(),
            description: rest(),
        })
    } else {
        None
    }
}

/// Last resort: split the flattened text on `". "` and fill missing fields
fn fill_from_sentences(text: &str, draft: &mut Draft) {
    let flattened = text.replace('\n', " ");
    let sentences: Vec<&str> = flattened.split(". ").collect();
    let potential_title = sentences.first().map(|s| s.trim()).unwrap_or("");

    if draft.title.is_empty() && potential_title.chars().count() <= MAX_TITLE_CHARS {
        draft.title = potential_title.to_string();
        if draft.description.is_empty() {
            draft.description = sentences[1..].join(". ").trim().to_string();
        }
    } else if draft.description.is_empty() {
        // TODO: this can echo prompt text back as the description when the model
        // ignored the format entirely; decide whether to reject instead
        draft.description = flattened.trim().to_string();
    }
}

/// Strip quote/emphasis wrapping and clamp to the title limit
pub fn clean_title(title: &str) -> String {
    let cleaned = title
        .trim_matches('"')
        .trim_matches('\'')
        .trim_matches('*')
        .trim();

    truncate_title(cleaned)
}

/// Titles longer than the limit become 50 chars + "..."
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let head: String = title.chars().take(TRUNCATED_TITLE_CHARS).collect();
        format!("{}{}", head, ELLIPSIS)
    } else {
        title.to_string()
    }
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    if head.eq_ignore_ascii_case(label) {
        Some(&line[label.len()..])
    } else {
        None
    }
}

fn strip_emphasis(s: &str) -> &str {
    s.trim().trim_matches('*').trim()
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"').trim_matches('\'')
}
