//! Markdown export into a host document

use std::path::Path;
use tracing::{debug, info};

use crate::config::TranscriptSettings;
use crate::error::{Result, TranscriptError};
use crate::insertion::plan_insertion;
use crate::render::MarkdownRenderer;
use crate::source::{CaptionSource, FetchOptions};
use crate::transcript::Cadence;

/// Editor operations needed to insert an export
pub trait Document {
    fn text(&self) -> &str;
    fn cursor_offset(&self) -> usize;
    /// Insert `text` at `offset`
    fn replace_range(&mut self, offset: usize, text: &str);
}

/// In-memory document used for files and tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringDocument {
    text: String,
    cursor: usize,
}

impl StringDocument {
    pub fn new(text: impl Into<String>, cursor: usize) -> Self {
        Self {
            text: text.into(),
            cursor,
        }
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl Document for StringDocument {
    fn text(&self) -> &str {
        &self.text
    }

    fn cursor_offset(&self) -> usize {
        self.cursor
    }

    fn replace_range(&mut self, offset: usize, text: &str) {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        self.text.insert_str(offset, text);
        self.cursor = offset + text.len();
    }
}

/// Result of an insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionReport {
    pub offset: usize,
    pub inserted_len: usize,
    pub fragment_count: usize,
}

/// Rendered markdown export and the number of fragments it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownExport {
    pub markdown: String,
    pub fragment_count: usize,
}

/// Fetch a transcript and render it as markdown.
///
/// The URL and cadence are checked before anything is fetched. An empty
/// transcript is reported as `NoCaptionsAvailable`.
pub async fn render_markdown_export(
    source: &dyn CaptionSource,
    settings: &TranscriptSettings,
    url: &str,
) -> Result<MarkdownExport> {
    let url = url.trim();
    if url.is_empty() {
        return Err(TranscriptError::InvalidUrl("empty URL".to_string()));
    }
    let cadence = Cadence::new(settings.timestamp_mod as i64)?;

    let fetched = source.fetch_transcript(url, &FetchOptions::from(settings)).await?;
    if fetched.is_empty() {
        return Err(TranscriptError::NoCaptionsAvailable(url.to_string()));
    }

    let markdown = MarkdownRenderer::new(cadence).render(fetched.title.as_deref(), url, &fetched.fragments);
    Ok(MarkdownExport {
        markdown,
        fragment_count: fetched.fragments.len(),
    })
}

/// Fetch, render and insert a transcript at the document's cursor
pub async fn export_markdown(
    source: &dyn CaptionSource,
    settings: &TranscriptSettings,
    url: &str,
    document: &mut dyn Document,
) -> Result<InsertionReport> {
    let export = render_markdown_export(source, settings, url).await?;

    let plan = plan_insertion(document.text(), document.cursor_offset());
    let text = plan.prepare(&export.markdown);
    document.replace_range(plan.offset, &text);

    info!(
        "📝 Inserted {} fragments ({} bytes) at offset {}",
        export.fragment_count,
        text.len(),
        plan.offset
    );

    Ok(InsertionReport {
        offset: plan.offset,
        inserted_len: text.len(),
        fragment_count: export.fragment_count,
    })
}

/// Read a document to insert into; a file that does not exist yet is empty.
///
/// Any other failure (permissions, text that is not UTF-8) is an error so the
/// file is never overwritten with content it did not hold.
pub async fn read_document(path: &Path) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} does not exist, starting from an empty document", path.display());
            Ok(String::new())
        }
        Err(e) => Err(TranscriptError::DocumentRead {
            path: path.display().to_string(),
            source: e,
        }),
    }
}

/// Insert a transcript into a markdown file at `cursor` (end of file when `None`)
pub async fn export_markdown_to_file(
    source: &dyn CaptionSource,
    settings: &TranscriptSettings,
    url: &str,
    path: &Path,
    cursor: Option<usize>,
) -> Result<InsertionReport> {
    let text = read_document(path).await?;
    let cursor = cursor.unwrap_or(text.len());
    let mut document = StringDocument::new(text, cursor);

    let report = export_markdown(source, settings, url, &mut document).await?;
    tokio::fs::write(path, document.into_text()).await?;
    info!("✅ Inserted transcript into {} at offset {}", path.display(), report.offset);

    Ok(report)
}
