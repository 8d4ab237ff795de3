/// Marker appended to transcripts that were cut short
pub const TRUNCATION_MARKER: &str = "...";

/// Build the SEO copywriting prompt around a transcript.
///
/// The transcript is embedded verbatim; everything else is fixed so that the
/// `TITLE:` / `DESCRIPTION:` contract the parser expects stays in one place.
pub fn build_prompt(transcript: &str) -> String {
    format!(
        r#"You are an expert YouTube SEO copywriter. Create compelling metadata that maximizes click-through rates and engagement.

VIDEO TRANSCRIPT:
{transcript}

INSTRUCTIONS:
1. TITLE (≤53 characters):
   - Start with a powerful hook (number, question, or emotional trigger)
   - Include the main topic/keyword naturally
   - Use action words and create curiosity
   - Avoid clickbait but make it irresistible
   - Never use "!" in the title
   - Not every title needs to talk about "learning" or a "journey"
   - Do not sound extraordinary, just be natural and engaging

2. DESCRIPTION (≤140 words total):
   - First paragraph: Hook + brief value proposition (2-3 sentences)
   - Second paragraph: Key benefits/insights + call to action (2-3 sentences)
   - Use conversational, engaging language
   - Describe what the video says and what it is for, so a viewer knows what to expect
   - Do not sound extraordinary, just be natural and engaging

FORMAT YOUR RESPONSE EXACTLY LIKE THIS:
TITLE: [Your catchy title here]
DESCRIPTION: [Your engaging description here]

Remember: Quality over quantity. Make every word count for maximum impact."#
    )
}

/// Cut a transcript to `max_chars` characters, appending the truncation marker.
///
/// Returns the (possibly shortened) text and whether anything was cut.
pub fn truncate_transcript(transcript: &str, max_chars: usize) -> (String, bool) {
    match transcript.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (
            format!("{}{}", &transcript[..byte_idx], TRUNCATION_MARKER),
            true,
        ),
        None => (transcript.to_string(), false),
    }
}
