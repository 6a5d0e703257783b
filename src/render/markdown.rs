use crate::transcript::{format_offset_millis, segment, Cadence, CaptionFragment, SegmentMode};
use std::fmt::Write as FmtWrite;
use tracing::debug;

/// Heading used when the source could not provide a title
pub const DEFAULT_TITLE: &str = "YouTube Transcript";

/// Renders a transcript as a markdown section with inline bold timestamps
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    cadence: Cadence,
}

impl MarkdownRenderer {
    pub fn new(cadence: Cadence) -> Self {
        Self { cadence }
    }

    /// Render the heading, video link and timestamped body.
    ///
    /// Every `cadence` fragments get a `**[M:SS]** ` marker and every completed run
    /// ends in a paragraph break. Trailing whitespace after the last fragment is kept.
    pub fn render(&self, title: Option<&str>, source_url: &str, fragments: &[CaptionFragment]) -> String {
        let title = title
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or(DEFAULT_TITLE);

        let mut output = String::new();
        let _ = write!(output, "## {}\n\n[Video Link]({})\n\n", title, source_url);
        output.push_str(&self.render_body(fragments));
        output
    }

    /// Render only the timestamped body
    pub fn render_body(&self, fragments: &[CaptionFragment]) -> String {
        let blocks = segment(fragments, self.cadence, SegmentMode::Markdown);
        debug!("Rendering {} markdown runs from {} fragments", blocks.len(), fragments.len());

        let mut body = String::new();
        for block in &blocks {
            let _ = write!(body, "**[{}]** ", format_offset_millis(block.start_offset_millis));
            body.push_str(&block.merged_text);
            body.push(' ');

            if block.fragment_count == self.cadence.get() {
                body.push_str("\n\n");
            }
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<CaptionFragment> {
        vec![
            CaptionFragment::new("Hello", 0),
            CaptionFragment::new("world", 1000),
            CaptionFragment::new("foo", 2000),
            CaptionFragment::new("bar", 3000),
            CaptionFragment::new("baz", 4000),
        ]
    }

    #[test]
    fn test_markers_and_paragraph_breaks() {
        let renderer = MarkdownRenderer::new(Cadence::new(2).unwrap());
        let body = renderer.render_body(&sample());
        assert_eq!(
            body,
            "**[0:00]** Hello world \n\n**[0:02]** foo bar \n\n**[0:04]** baz "
        );
    }

    #[test]
    fn test_full_document_shape() {
        let renderer = MarkdownRenderer::new(Cadence::new(5).unwrap());
        let output = renderer.render(Some("My Talk"), "https://www.youtube.com/watch?v=abc", &sample());
        assert_eq!(
            output,
            "## My Talk\n\n[Video Link](https://www.youtube.com/watch?v=abc)\n\n\
             **[0:00]** Hello world foo bar baz \n\n"
        );
    }

    #[test]
    fn test_missing_title_uses_default() {
        let renderer = MarkdownRenderer::new(Cadence::default());
        let output = renderer.render(None, "https://youtu.be/abc", &[]);
        assert_eq!(output, "## YouTube Transcript\n\n[Video Link](https://youtu.be/abc)\n\n");

        let output = renderer.render(Some("   "), "https://youtu.be/abc", &[]);
        assert!(output.starts_with("## YouTube Transcript\n"));
    }

    #[test]
    fn test_cadence_one_marks_every_fragment() {
        let renderer = MarkdownRenderer::new(Cadence::new(1).unwrap());
        let body = renderer.render_body(&sample()[..2]);
        assert_eq!(body, "**[0:00]** Hello \n\n**[0:01]** world \n\n");
    }

    #[test]
    fn test_hour_long_offsets() {
        let renderer = MarkdownRenderer::new(Cadence::new(1).unwrap());
        let body = renderer.render_body(&[CaptionFragment::new("late", 3_661_500)]);
        assert_eq!(body, "**[1:01:01]** late \n\n");
    }
}
