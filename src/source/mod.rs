//! Caption sources
//!
//! The engine never fetches anything itself; it is handed fragments by a
//! `CaptionSource`. `youtube` talks to the video site, `file` reads transcripts
//! saved as JSON.

pub mod file;
pub mod youtube;

pub use file::TranscriptFileSource;
pub use youtube::{extract_video_id, YouTubeCaptionSource};

use crate::config::TranscriptSettings;
use crate::error::Result;
use crate::transcript::FetchedTranscript;
use async_trait::async_trait;

/// Language preferences passed to a caption source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub lang: String,
    pub country: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            country: "EN".to_string(),
        }
    }
}

impl From<&TranscriptSettings> for FetchOptions {
    fn from(settings: &TranscriptSettings) -> Self {
        Self {
            lang: settings.lang.clone(),
            country: settings.country.clone(),
        }
    }
}

/// Trait for caption providers
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch the caption track for a video URL or id
    async fn fetch_transcript(&self, url: &str, options: &FetchOptions) -> Result<FetchedTranscript>;

    /// Look up the video title in the preferred language
    async fn fetch_title(&self, url: &str, options: &FetchOptions) -> Result<String>;

    fn name(&self) -> &'static str;
}
