/// YouTube Transcript - Rust Implementation
///
/// Fetches a video's caption track and turns the flat list of timed fragments into
/// a timestamped markdown section or a grouped, clickable block display.

pub mod config;
pub mod error;
pub mod export;
pub mod insertion;
pub mod panel;
pub mod render;
pub mod source;
pub mod transcript;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder, LoadedConfig, OutputFormat, TranscriptSettings};
pub use crate::error::{ErrorKind, Result, TranscriptError};
pub use crate::export::{
    export_markdown, export_markdown_to_file, read_document, render_markdown_export, Document, InsertionReport,
    StringDocument,
};
pub use crate::insertion::{plan_insertion, InsertionPlan};
pub use crate::panel::{load_panel, PanelId, PanelRegistry, PanelSection, PanelState};
pub use crate::render::{BlockView, InteractiveRenderer, MarkdownRenderer, TranscriptView};
pub use crate::source::{CaptionSource, FetchOptions, TranscriptFileSource, YouTubeCaptionSource};
pub use crate::transcript::{format_timestamp, segment, Block, Cadence, CaptionFragment, FetchedTranscript, SegmentMode};
