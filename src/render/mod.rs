//! Output forms derived from a segmented transcript
//!
//! `markdown` produces the flat document inserted into notes, `interactive` the
//! grouped block model shown in a transcript panel.

pub mod interactive;
pub mod markdown;

pub use interactive::{jump_url, BlockView, InteractiveRenderer, SearchHit, TranscriptView};
pub use markdown::{MarkdownRenderer, DEFAULT_TITLE};
