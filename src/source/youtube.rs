//! YouTube caption source

use super::{CaptionSource, FetchOptions};
use crate::config::SourceConfig;
use crate::error::{Result, TranscriptError};
use crate::transcript::{CaptionFragment, FetchedTranscript};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const VIDEO_ID_PATTERN: &str = r"^[A-Za-z0-9_-]{11}$";

/// Fetches caption tracks from YouTube watch pages
#[derive(Clone)]
pub struct YouTubeCaptionSource {
    client: Client,
    base_url: String,
}

/// A caption track advertised by the player
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    /// `asr` for auto-generated tracks
    #[serde(default)]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerCaptions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedTextEvent>,
}

#[derive(Debug, Deserialize)]
struct TimedTextEvent {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(default)]
    segs: Option<Vec<TimedTextSegment>>,
}

#[derive(Debug, Deserialize)]
struct TimedTextSegment {
    #[serde(default)]
    utf8: String,
}

impl YouTubeCaptionSource {
    /// Create a new source from configuration
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn watch_url(&self, video_id: &str, lang: &str, country: &str) -> String {
        format!(
            "{}/watch?v={}&hl={}&gl={}",
            self.base_url,
            video_id,
            urlencoding::encode(lang),
            urlencoding::encode(country)
        )
    }

    /// Watch page requested for both the title and the caption tracks
    fn page_url(&self, video_id: &str, options: &FetchOptions) -> String {
        self.watch_url(video_id, &options.lang, &options.country)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(TranscriptError::Http {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl CaptionSource for YouTubeCaptionSource {
    async fn fetch_transcript(&self, url: &str, options: &FetchOptions) -> Result<FetchedTranscript> {
        let video_id = extract_video_id(url)?;
        info!("🎬 Fetching captions for video {} ({}/{})", video_id, options.lang, options.country);

        let page = self.get_text(&self.page_url(&video_id, options)).await?;

        let tracks = parse_caption_tracks(&page, &video_id)?;
        debug!("Found {} caption tracks", tracks.len());
        let track = select_track(&tracks, &options.lang, &video_id)?;
        info!("📝 Using caption track '{}'", track.language_code);

        let body = self.get_text(&format!("{}&fmt=json3", track.base_url)).await?;
        let fragments = parse_json3(&body)?;
        info!("✅ Received {} caption fragments", fragments.len());

        Ok(FetchedTranscript::new(extract_title(&page), fragments))
    }

    async fn fetch_title(&self, url: &str, options: &FetchOptions) -> Result<String> {
        let video_id = extract_video_id(url)?;
        let page = self.get_text(&self.page_url(&video_id, options)).await?;

        extract_title(&page).ok_or_else(|| {
            warn!("No title found on watch page for {}", video_id);
            TranscriptError::Parse(format!("no title on watch page for {}", video_id))
        })
    }

    fn name(&self) -> &'static str {
        "youtube"
    }
}

/// Extract the 11-character video id from a URL or bare id
pub fn extract_video_id(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(TranscriptError::InvalidUrl("empty URL".to_string()));
    }

    let id_pattern = Regex::new(VIDEO_ID_PATTERN).map_err(|e| TranscriptError::Parse(e.to_string()))?;
    if id_pattern.is_match(input) {
        return Ok(input.to_string());
    }

    let url = Url::parse(input).map_err(|_| TranscriptError::InvalidUrl(input.to_string()))?;
    let host = url.host_str().unwrap_or_default().trim_start_matches("www.").trim_start_matches("m.");
    let mut segments = url.path_segments().map(|s| s.collect::<Vec<_>>()).unwrap_or_default();
    segments.retain(|segment| !segment.is_empty());

    let candidate = match host {
        "youtu.be" => segments.first().map(|s| s.to_string()),
        "youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => match segments.as_slice() {
            ["watch"] => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            ["embed" | "shorts" | "live" | "v", id, ..] => Some(id.to_string()),
            _ => None,
        },
        _ => None,
    };

    match candidate {
        Some(id) if id_pattern.is_match(&id) => Ok(id),
        _ => Err(TranscriptError::InvalidUrl(input.to_string())),
    }
}

/// Pull the caption track list out of a watch page
pub fn parse_caption_tracks(page: &str, video_id: &str) -> Result<Vec<CaptionTrack>> {
    let Some((_, after)) = page.split_once("\"captions\":") else {
        if page.contains("class=\"g-recaptcha\"") {
            return Err(TranscriptError::Http {
                status: 429,
                url: format!("watch page for {}", video_id),
            });
        }
        return Err(TranscriptError::NoCaptionsAvailable(video_id.to_string()));
    };

    let json = after
        .split_once(",\"videoDetails\"")
        .map(|(captions, _)| captions)
        .ok_or_else(|| TranscriptError::Parse("unterminated captions block".to_string()))?;

    let captions: PlayerCaptions = serde_json::from_str(json)?;
    let tracks = captions
        .player_captions_tracklist_renderer
        .map(|renderer| renderer.caption_tracks)
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(TranscriptError::NoCaptionsAvailable(video_id.to_string()));
    }
    Ok(tracks)
}

/// Pick the track whose language code equals `lang`
pub fn select_track<'a>(tracks: &'a [CaptionTrack], lang: &str, video_id: &str) -> Result<&'a CaptionTrack> {
    if tracks.is_empty() {
        return Err(TranscriptError::NoCaptionsAvailable(video_id.to_string()));
    }

    tracks
        .iter()
        .find(|track| track.language_code == lang)
        .ok_or_else(|| TranscriptError::LanguageNotAvailable {
            lang: lang.to_string(),
            available: tracks.iter().map(|track| track.language_code.clone()).collect(),
        })
}

/// Parse a `fmt=json3` timed text document into fragments
pub fn parse_json3(body: &str) -> Result<Vec<CaptionFragment>> {
    let timed_text: TimedText = serde_json::from_str(body)?;

    let fragments = timed_text
        .events
        .into_iter()
        .filter_map(|event| {
            let segs = event.segs?;
            let text = segs
                .iter()
                .map(|seg| seg.utf8.as_str())
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");

            if text.is_empty() {
                None
            } else {
                Some(CaptionFragment::new(text, event.start_ms))
            }
        })
        .collect();

    Ok(fragments)
}

/// Video title from the watch page markup
pub fn extract_title(page: &str) -> Option<String> {
    let document = Html::parse_document(page);

    if let Ok(selector) = Selector::parse(r#"meta[name="title"]"#) {
        let meta_title = document
            .select(&selector)
            .filter_map(|element| element.value().attr("content"))
            .map(str::trim)
            .find(|content| !content.is_empty());
        if let Some(title) = meta_title {
            return Some(title.to_string());
        }
    }

    let selector = Selector::parse("title").ok()?;
    let title = document.select(&selector).next()?.text().collect::<String>();
    let title = title.trim().trim_end_matches("- YouTube").trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}
