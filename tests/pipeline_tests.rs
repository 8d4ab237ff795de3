use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ytmeta::captions::CaptionSource;
use ytmeta::completion::{CompletionClient, CompletionError, CompletionRequest};
use ytmeta::metadata::{GenerationSettings, MetadataExtractor, RetryPolicy};
use ytmeta::pipeline::{BatchStats, MetadataPipeline, PipelineSettings};

const SAMPLE_VTT: &str = "WEBVTT\nKind: captions\nLanguage: en\n\n00:00:00.000 --> 00:00:02.000\ntoday we <c>fix</c> a flat tire\n\n00:00:02.000 --> 00:00:04.000\ntoday we <c>fix</c> a flat tire\n\n00:00:04.000 --> 00:00:06.000\nyou only need two levers &amp; a pump\n";

/// Caption source that always returns the same document
struct FixedCaptions(&'static str);

#[async_trait]
impl CaptionSource for FixedCaptions {
    async fn fetch_captions(&self, _input: &str) -> ytmeta::Result<String> {
        Ok(self.0.to_string())
    }

    fn source_name(&self) -> &'static str {
        "fixed"
    }
}

/// Completion client that replays scripted answers and records every prompt
#[derive(Clone, Default)]
struct ScriptedClient {
    answers: Arc<Mutex<VecDeque<Result<String, CompletionError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedClient {
    fn new(answers: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            answers: Arc::new(Mutex::new(answers.into())),
            prompts: Arc::default(),
        }
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn prompt(&self, index: usize) -> String {
        self.prompts.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CompletionError::EmptyResponse))
    }
}

fn rate_limited() -> Result<String, CompletionError> {
    Err(CompletionError::Api {
        status: 429,
        message: "Rate limit reached for model".to_string(),
    })
}

fn pipeline(
    captions: &'static str,
    client: ScriptedClient,
    settings: PipelineSettings,
) -> MetadataPipeline {
    let extractor = MetadataExtractor::new(Box::new(client), GenerationSettings::default())
        .with_retry_policy(RetryPolicy::immediate());

    MetadataPipeline::new(Box::new(FixedCaptions(captions)), extractor, settings)
}

fn fast_settings() -> PipelineSettings {
    PipelineSettings {
        batch_pause: Duration::ZERO,
        ..PipelineSettings::default()
    }
}

#[tokio::test]
async fn test_process_end_to_end() {
    let client = ScriptedClient::new(vec![Ok(concat!(
        "TITLE: \"Fix A Flat In Two Minutes\"\n",
        "DESCRIPTION: All you need is two levers.\nAnd a pump."
    )
    .to_string())]);
    let pipeline = pipeline(SAMPLE_VTT, client.clone(), fast_settings());

    let meta = pipeline
        .process("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        .await
        .expect("pipeline should succeed");

    assert_eq!(meta.video_id, "dQw4w9WgXcQ");
    assert_eq!(meta.title, "Fix A Flat In Two Minutes");
    assert_eq!(meta.description, "All you need is two levers. And a pump.");

    assert_eq!(client.calls(), 1);
    let prompt = client.prompt(0);
    assert!(prompt.contains("today we fix a flat tire you only need two levers  a pump"));
    assert!(!prompt.contains("-->"));
    assert!(!prompt.contains("Kind: captions"));
}

#[tokio::test]
async fn test_long_transcripts_are_truncated_before_prompting() {
    let client = ScriptedClient::new(vec![Ok("TITLE: Short\nDESCRIPTION: Fine.".to_string())]);
    let settings = PipelineSettings {
        max_transcript_chars: 10,
        ..fast_settings()
    };
    let pipeline = pipeline(SAMPLE_VTT, client.clone(), settings);

    assert!(pipeline.process("https://youtu.be/dQw4w9WgXcQ").await.is_some());
    assert!(client.prompt(0).contains("VIDEO TRANSCRIPT:\ntoday we f...\n"));
}

#[tokio::test]
async fn test_rate_limits_exhaust_after_max_retries() {
    let client = ScriptedClient::new(vec![
        rate_limited(),
        rate_limited(),
        rate_limited(),
        Ok("TITLE: Too Late\nDESCRIPTION: Never reached.".to_string()),
    ]);
    let pipeline = pipeline(SAMPLE_VTT, client.clone(), fast_settings());

    assert!(pipeline.process("https://youtu.be/dQw4w9WgXcQ").await.is_none());
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn test_unformatted_answer_falls_back_to_sentences() {
    let client = ScriptedClient::new(vec![Ok(
        "This video explains everything. It covers three topics in depth.".to_string(),
    )]);
    let pipeline = pipeline(SAMPLE_VTT, client, fast_settings());

    let meta = pipeline.process("https://youtu.be/dQw4w9WgXcQ").await.unwrap();
    assert_eq!(meta.title, "This video explains everything");
    assert_eq!(meta.description, "It covers three topics in depth.");
}

#[tokio::test]
async fn test_bad_inputs_never_reach_the_service() {
    let client = ScriptedClient::new(vec![]);

    let no_id = pipeline(SAMPLE_VTT, client.clone(), fast_settings());
    assert!(no_id.process("https://example.com/video").await.is_none());
    assert!(no_id.process("not a url").await.is_none());

    let empty_captions = pipeline(
        "WEBVTT\n\n00:00:00.000 --> 00:00:01.000\n\n",
        client.clone(),
        fast_settings(),
    );
    assert!(empty_captions.process("https://youtu.be/dQw4w9WgXcQ").await.is_none());

    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_batch_continues_past_failures() {
    let client = ScriptedClient::new(vec![
        Ok("TITLE: First Video\nDESCRIPTION: One.".to_string()),
        Ok("TITLE: Third Video\nDESCRIPTION: Three.".to_string()),
    ]);
    let pipeline = pipeline(SAMPLE_VTT, client.clone(), fast_settings());

    let urls = vec![
        "https://youtu.be/aaaaaaaaaaa".to_string(),
        "https://example.com/nope".to_string(),
        "   ".to_string(),
        "https://youtu.be/ccccccccccc".to_string(),
    ];

    let mut stats = BatchStats::new();
    let mut titles = Vec::new();
    pipeline
        .process_batch(&urls, &mut stats, |_, meta| {
            if let Some(meta) = meta {
                titles.push(meta.title.clone());
            }
        })
        .await;

    assert_eq!(stats.processed, 3);
    assert_eq!(stats.succeeded, 2);
    assert_eq!(stats.failed_urls, vec!["https://example.com/nope"]);
    assert_eq!(titles, vec!["First Video", "Third Video"]);
    assert_eq!(client.calls(), 2);
}
