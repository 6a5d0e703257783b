//! Transcript panels: which URL each open panel shows, and loading its content

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use crate::config::TranscriptSettings;
use crate::error::TranscriptError;
use crate::render::{InteractiveRenderer, TranscriptView};
use crate::source::{CaptionSource, FetchOptions};

/// Identifier assigned to a panel when it is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(pub u64);

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panel-{}", self.0)
    }
}

impl FromStr for PanelId {
    type Err = TranscriptError;

    /// Accepts `panel-3` as well as a bare `3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        s.strip_prefix("panel-")
            .unwrap_or(s)
            .parse::<u64>()
            .map(PanelId)
            .map_err(|_| TranscriptError::InvalidInput(format!("not a panel id: {}", s)))
    }
}

/// Persisted URL of one open panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelEntry {
    pub id: PanelId,
    pub url: String,
}

/// Open panels keyed by id rather than by position.
///
/// Persisted through `Config::panel_registry` / `Config::store_panels`; the
/// `panels` subcommand opens, lists and closes entries.
#[derive(Debug, Clone, Default)]
pub struct PanelRegistry {
    entries: Vec<PanelEntry>,
    next_id: u64,
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a registry from persisted entries
    pub fn from_entries(entries: Vec<PanelEntry>) -> Self {
        let next_id = entries.iter().map(|entry| entry.id.0 + 1).max().unwrap_or(0);
        Self { entries, next_id }
    }

    /// Register a new panel showing `url`
    pub fn open(&mut self, url: impl Into<String>) -> PanelId {
        let id = PanelId(self.next_id);
        self.next_id += 1;

        let url = url.into();
        info!("🪟 Opened {} for {}", id, url);
        self.entries.push(PanelEntry { id, url });
        id
    }

    /// Point an existing panel at a different URL
    pub fn set_url(&mut self, id: PanelId, url: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                entry.url = url.into();
                true
            }
            None => false,
        }
    }

    pub fn url(&self, id: PanelId) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.url.as_str())
    }

    /// Remove a closed panel's entry, leaving every other panel untouched
    pub fn close(&mut self, id: PanelId) -> Option<PanelEntry> {
        let position = self.entries.iter().position(|entry| entry.id == id);
        match position {
            Some(index) => {
                info!("🗑️ Closed {}", id);
                Some(self.entries.remove(index))
            }
            None => {
                warn!("Close requested for unknown {}", id);
                None
            }
        }
    }

    pub fn entries(&self) -> &[PanelEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One independently loaded part of a panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelSection<T> {
    Ready(T),
    Failed(String),
}

impl<T> PanelSection<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            PanelSection::Ready(value) => Some(value),
            PanelSection::Failed(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PanelSection::Ready(_))
    }
}

/// Everything a panel displays for one URL
#[derive(Debug, Clone)]
pub struct PanelState {
    pub url: String,
    pub title: PanelSection<String>,
    pub transcript: PanelSection<TranscriptView>,
}

/// Load title and transcript for a panel.
///
/// The title lookup runs first, then the transcript fetch. A failure in one is
/// reported in its own section and does not prevent the other from rendering.
pub async fn load_panel(source: &dyn CaptionSource, settings: &TranscriptSettings, url: &str) -> PanelState {
    let url = url.trim();
    if url.is_empty() {
        let message = TranscriptError::InvalidUrl("empty URL".to_string()).user_message();
        return PanelState {
            url: String::new(),
            title: PanelSection::Failed(message.clone()),
            transcript: PanelSection::Failed(message),
        };
    }

    let options = FetchOptions::from(settings);
    let title = match source.fetch_title(url, &options).await {
        Ok(title) => PanelSection::Ready(title),
        Err(e) => {
            warn!("Title lookup failed for {}: {}", url, e);
            PanelSection::Failed(e.user_message())
        }
    };

    let transcript = match source.fetch_transcript(url, &options).await {
        Ok(fetched) if fetched.is_empty() => {
            PanelSection::Failed(TranscriptError::NoCaptionsAvailable(url.to_string()).user_message())
        }
        Ok(fetched) => {
            let view = InteractiveRenderer::new(settings.cadence()).view(fetched.fragments, url);
            info!("✅ Panel for {} shows {} blocks", url, view.len());
            PanelSection::Ready(view)
        }
        Err(e) => {
            warn!("Transcript fetch failed for {}: {}", url, e);
            PanelSection::Failed(e.user_message())
        }
    };

    PanelState {
        url: url.to_string(),
        title,
        transcript,
    }
}
