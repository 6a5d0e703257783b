//! Transcripts saved to disk as JSON

use super::{CaptionSource, FetchOptions};
use crate::error::{Result, TranscriptError};
use crate::transcript::{CaptionFragment, FetchedTranscript};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Segment as written by `youtube-transcript-api` (seconds, not milliseconds)
#[derive(Debug, Deserialize)]
struct LegacySegment {
    text: String,
    start: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TranscriptFile {
    Native(FetchedTranscript),
    Legacy(Vec<LegacySegment>),
}

/// Caption source backed by a local JSON file.
///
/// Accepts either a serialized `FetchedTranscript` or a plain array of
/// `{text, start, duration}` segments. The URL passed to the trait methods is only
/// used for links; the file content is the transcript.
#[derive(Debug, Clone)]
pub struct TranscriptFileSource {
    path: PathBuf,
}

impl TranscriptFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load and normalize the transcript file
    pub async fn load(&self) -> Result<FetchedTranscript> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let transcript = parse_transcript_file(&content)?;
        info!("📄 Loaded {} fragments from {}", transcript.fragments.len(), self.path.display());
        Ok(transcript)
    }
}

/// Parse either supported transcript layout
pub fn parse_transcript_file(content: &str) -> Result<FetchedTranscript> {
    let parsed: TranscriptFile = serde_json::from_str(content)
        .map_err(|e| TranscriptError::Parse(format!("unrecognised transcript file: {}", e)))?;

    let transcript = match parsed {
        TranscriptFile::Native(transcript) => FetchedTranscript::new(
            transcript.title,
            transcript
                .fragments
                .into_iter()
                .map(|fragment| CaptionFragment::new(fragment.text, fragment.offset_millis))
                .filter(|fragment| !fragment.text.is_empty())
                .collect(),
        ),
        TranscriptFile::Legacy(segments) => FetchedTranscript::new(
            None,
            segments
                .into_iter()
                .map(|segment| CaptionFragment::new(segment.text, (segment.start.max(0.0) * 1000.0) as u64))
                .filter(|fragment| !fragment.text.is_empty())
                .collect(),
        ),
    };

    Ok(transcript)
}

#[async_trait]
impl CaptionSource for TranscriptFileSource {
    async fn fetch_transcript(&self, _url: &str, _options: &FetchOptions) -> Result<FetchedTranscript> {
        self.load().await
    }

    async fn fetch_title(&self, _url: &str, _options: &FetchOptions) -> Result<String> {
        self.load()
            .await?
            .title
            .ok_or_else(|| TranscriptError::Parse(format!("{} has no title", self.path.display())))
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
