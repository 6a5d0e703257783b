//! Frontmatter-aware placement of exported text in a host document

use regex::Regex;
use tracing::debug;

/// Leading YAML frontmatter: `---`, one or more non-empty lines, `---`
const FRONTMATTER_PATTERN: &str = r"\A---\n(?:.+\n)+?---\n";

/// Where exported text should go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPlan {
    /// Byte offset in the document to insert at
    pub offset: usize,
    /// Insert a newline before the text
    pub needs_leading_newline: bool,
    /// Length of the frontmatter block, if the document has one
    pub frontmatter_end: Option<usize>,
}

impl InsertionPlan {
    /// Text to insert, prefixed with a newline when the plan asks for one
    pub fn prepare(&self, text: &str) -> String {
        if self.needs_leading_newline {
            format!("\n{}", text)
        } else {
            text.to_string()
        }
    }
}

/// Length of the frontmatter block at the very start of `document`, if any
pub fn frontmatter_end(document: &str) -> Option<usize> {
    let pattern = Regex::new(FRONTMATTER_PATTERN).ok()?;
    pattern.find(document).map(|m| m.end())
}

/// Decide where to insert given the document text and cursor offset.
///
/// A cursor inside (or at the end of) the frontmatter is moved to just past it.
/// Cursors beyond the document are clamped to its end.
pub fn plan_insertion(document: &str, cursor_offset: usize) -> InsertionPlan {
    let cursor = cursor_offset.min(document.len());
    let frontmatter_end = frontmatter_end(document);

    match frontmatter_end {
        Some(end) if cursor <= end => {
            let followed_by_blank_line = document[end..].starts_with("\n\n");
            debug!("Cursor {} inside frontmatter, inserting at {}", cursor, end);
            InsertionPlan {
                offset: end,
                needs_leading_newline: !followed_by_blank_line,
                frontmatter_end,
            }
        }
        _ => InsertionPlan {
            offset: cursor,
            needs_leading_newline: false,
            frontmatter_end,
        },
    }
}
