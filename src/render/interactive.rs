use crate::transcript::{
    format_timestamp, join_fragment_text, segment, Block, Cadence, CaptionFragment, SegmentMode,
};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

/// One clickable block in the grouped transcript display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockView {
    /// Display label such as `1:05`
    pub timestamp_label: String,
    /// Whole seconds from the start of the video
    pub timestamp_seconds: u64,
    /// Source URL with `&t={seconds}` appended
    pub jump_url: String,
    /// Merged fragment text
    pub quote_text: String,
}

impl BlockView {
    fn from_block(block: &Block, source_url: &str) -> Self {
        let seconds = block.start_seconds();
        Self {
            timestamp_label: format_timestamp(seconds as f64),
            timestamp_seconds: seconds,
            jump_url: jump_url(source_url, seconds),
            quote_text: block.merged_text.trim_end().to_string(),
        }
    }
}

/// Jump link for a position in the video.
///
/// Plain concatenation: the source URL is expected to already carry a query string.
pub fn jump_url(source_url: &str, seconds: u64) -> String {
    format!("{}&t={}", source_url, seconds)
}

/// Builds the grouped display model
#[derive(Debug, Clone, Copy)]
pub struct InteractiveRenderer {
    cadence: Cadence,
}

impl InteractiveRenderer {
    pub fn new(cadence: Cadence) -> Self {
        Self { cadence }
    }

    /// Group fragments into block views
    pub fn render(&self, fragments: &[CaptionFragment], source_url: &str) -> Vec<BlockView> {
        let blocks = segment(fragments, self.cadence, SegmentMode::Interactive);
        debug!("Built {} transcript blocks from {} fragments", blocks.len(), fragments.len());
        blocks
            .iter()
            .map(|block| BlockView::from_block(block, source_url))
            .collect()
    }

    /// Build the full view model including the copy-all text
    pub fn view(&self, fragments: Vec<CaptionFragment>, source_url: &str) -> TranscriptView {
        let blocks = self.render(&fragments, source_url);
        TranscriptView {
            source_url: source_url.to_string(),
            blocks,
            fragments,
        }
    }
}

/// Grouped transcript as shown in a panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptView {
    pub source_url: String,
    pub blocks: Vec<BlockView>,
    fragments: Vec<CaptionFragment>,
}

/// A block matching a search query, with byte ranges of each match in its quote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit<'a> {
    pub block: &'a BlockView,
    pub highlights: Vec<Range<usize>>,
}

impl SearchHit<'_> {
    /// Quote text with every match wrapped in `open`/`close`
    pub fn highlighted(&self, open: &str, close: &str) -> String {
        let text = &self.block.quote_text;
        let mut output = String::with_capacity(text.len());
        let mut last = 0;

        for range in &self.highlights {
            output.push_str(&text[last..range.start]);
            output.push_str(open);
            output.push_str(&text[range.clone()]);
            output.push_str(close);
            last = range.end;
        }
        output.push_str(&text[last..]);
        output
    }
}

impl TranscriptView {
    pub fn fragments(&self) -> &[CaptionFragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Every fragment in source order, joined by single spaces
    pub fn copy_all_text(&self) -> String {
        join_fragment_text(&self.fragments)
    }

    /// Text exported when a block is dragged out of the panel
    pub fn drag_payload(&self, index: usize) -> Option<&str> {
        self.blocks.get(index).map(|block| block.quote_text.as_str())
    }

    /// Context-menu copy on a block: always the whole transcript
    pub fn context_copy(&self, index: usize) -> Option<String> {
        self.blocks.get(index).map(|_| self.copy_all_text())
    }

    /// Blocks whose quote contains `query`, ignoring case.
    ///
    /// An empty query matches every block with no highlights.
    pub fn search(&self, query: &str) -> Vec<SearchHit<'_>> {
        let query = query.trim();
        if query.is_empty() {
            return self
                .blocks
                .iter()
                .map(|block| SearchHit { block, highlights: Vec::new() })
                .collect();
        }

        let matcher = match RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
        {
            Ok(matcher) => matcher,
            Err(e) => {
                debug!("Search query could not be compiled: {}", e);
                return Vec::new();
            }
        };

        self.blocks
            .iter()
            .filter_map(|block| {
                let highlights: Vec<Range<usize>> = matcher
                    .find_iter(&block.quote_text)
                    .map(|m| m.range())
                    .collect();
                if highlights.is_empty() {
                    None
                } else {
                    Some(SearchHit { block, highlights })
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn sample() -> Vec<CaptionFragment> {
        vec![
            CaptionFragment::new("Never gonna", 0),
            CaptionFragment::new("give you up", 1_200),
            CaptionFragment::new("never gonna", 2_900),
            CaptionFragment::new("let you down", 4_100),
            CaptionFragment::new("Never gonna run around", 61_500),
        ]
    }

    fn view(cadence: i64) -> TranscriptView {
        InteractiveRenderer::new(Cadence::new(cadence).unwrap()).view(sample(), URL)
    }

    #[test]
    fn test_block_views() {
        let view = view(2);
        assert_eq!(view.len(), 3);

        assert_eq!(view.blocks[0].timestamp_label, "0:00");
        assert_eq!(view.blocks[0].quote_text, "Never gonna give you up");
        assert_eq!(view.blocks[1].timestamp_seconds, 2);
        assert_eq!(view.blocks[1].jump_url, format!("{}&t=2", URL));
        assert_eq!(view.blocks[2].timestamp_label, "1:01");
        assert_eq!(view.blocks[2].quote_text, "Never gonna run around");
    }

    #[test]
    fn test_jump_url_is_plain_concatenation() {
        assert_eq!(jump_url("https://youtu.be/abc?si=x", 90), "https://youtu.be/abc?si=x&t=90");
    }

    #[test]
    fn test_copy_all_ignores_blocking() {
        let expected = "Never gonna give you up never gonna let you down Never gonna run around";
        assert_eq!(view(1).copy_all_text(), expected);
        assert_eq!(view(3).copy_all_text(), expected);
    }

    #[test]
    fn test_drag_and_context_copy() {
        let view = view(2);
        assert_eq!(view.drag_payload(1), Some("never gonna let you down"));
        assert_eq!(view.drag_payload(9), None);
        assert_eq!(view.context_copy(0), view.context_copy(2));
        assert_eq!(view.context_copy(2).unwrap(), view.copy_all_text());
        assert_eq!(view.context_copy(3), None);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let view = view(2);
        let hits = view.search("NEVER");
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].highlights, vec![0..5]);

        let hits = view.search("you");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].highlighted("<", ">"), "Never gonna give <you> up");
    }

    #[test]
    fn test_search_escapes_regex_syntax() {
        let view = view(5);
        assert!(view.search("gonna.*").is_empty());
        assert_eq!(view.search("  ").len(), 1);
    }

    #[test]
    fn test_empty_fragments() {
        let view = InteractiveRenderer::new(Cadence::default()).view(Vec::new(), URL);
        assert!(view.is_empty());
        assert_eq!(view.copy_all_text(), "");
        assert!(view.search("x").is_empty());
    }
}
