//! Caption fragments and the segmentation engine built on them
//!
//! A transcript arrives from a caption source as an ordered list of timed fragments.
//! Everything downstream (markdown export, grouped blocks) is derived from that list
//! through `segment`, which never reorders or drops fragment text.

pub mod segment;
pub mod timestamp;

pub use segment::{segment, Block, SegmentMode};
pub use timestamp::{format_offset_millis, format_timestamp};

use crate::error::{Result, TranscriptError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of fragments grouped under one timestamp
pub const DEFAULT_CADENCE: u32 = 5;

/// One timed unit of caption text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaptionFragment {
    /// Caption text
    pub text: String,
    /// Offset from the start of the video in milliseconds
    pub offset_millis: u64,
}

impl CaptionFragment {
    /// Create a new fragment, trimming surrounding whitespace from the text
    pub fn new(text: impl Into<String>, offset_millis: u64) -> Self {
        let text = text.into();
        Self {
            text: text.trim().to_string(),
            offset_millis,
        }
    }

    /// Offset in whole seconds
    pub fn offset_seconds(&self) -> u64 {
        self.offset_millis / 1000
    }
}

/// Number of fragments per block, always at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cadence(u32);

impl Cadence {
    /// Validate a raw cadence value
    pub fn new(value: i64) -> Result<Self> {
        if value < 1 || value > u32::MAX as i64 {
            return Err(TranscriptError::InvalidCadence(value));
        }
        Ok(Self(value as u32))
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self(DEFAULT_CADENCE)
    }
}

impl TryFrom<i64> for Cadence {
    type Error = TranscriptError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Cadence> for u32 {
    fn from(cadence: Cadence) -> Self {
        cadence.0
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transcript as returned by a caption source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchedTranscript {
    /// Video title, when the source could determine it
    pub title: Option<String>,
    /// Fragments in source order
    pub fragments: Vec<CaptionFragment>,
}

impl FetchedTranscript {
    pub fn new(title: Option<String>, fragments: Vec<CaptionFragment>) -> Self {
        Self { title, fragments }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// All fragment texts joined by single spaces, in source order
    pub fn full_text(&self) -> String {
        join_fragment_text(&self.fragments)
    }
}

/// Join fragment texts with single spaces, preserving order
pub fn join_fragment_text(fragments: &[CaptionFragment]) -> String {
    fragments
        .iter()
        .map(|fragment| fragment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_trims_text() {
        let fragment = CaptionFragment::new("  hello there \n", 1500);
        assert_eq!(fragment.text, "hello there");
        assert_eq!(fragment.offset_seconds(), 1);
    }

    #[test]
    fn test_cadence_rejects_non_positive() {
        assert!(matches!(Cadence::new(0), Err(TranscriptError::InvalidCadence(0))));
        assert!(matches!(Cadence::new(-3), Err(TranscriptError::InvalidCadence(-3))));
        assert_eq!(Cadence::new(1).unwrap().get(), 1);
        assert_eq!(Cadence::default().get(), 5);
    }

    #[test]
    fn test_full_text_keeps_order() {
        let transcript = FetchedTranscript::new(
            None,
            vec![CaptionFragment::new("a", 0), CaptionFragment::new("b", 10), CaptionFragment::new("c", 20)],
        );
        assert_eq!(transcript.full_text(), "a b c");
    }
}
