//! Partitioning of caption fragments into timestamped blocks

use super::{Cadence, CaptionFragment};
use serde::{Deserialize, Serialize};

/// Where block boundaries are decided
///
/// Both modes yield one block per `cadence` fragments with the last block possibly
/// shorter. They differ in how the boundary is detected while walking the fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentMode {
    /// A block opens at every index where `i % cadence == 0`, starting at fragment 0,
    /// and closes after every index where `(i + 1) % cadence == 0`.
    Markdown,
    /// Fragment 0 opens a buffer without emitting anything; each later index with
    /// `i % cadence == 0` flushes the buffer (anchored at the fragment that opened it)
    /// and opens a new one. The trailing buffer is always flushed.
    Interactive,
}

/// A run of consecutive fragments merged under one timestamp
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    /// Offset of the first fragment in the block
    pub start_offset_millis: u64,
    /// Fragment texts joined by single spaces
    pub merged_text: String,
    /// Number of fragments merged into this block
    pub fragment_count: usize,
}

impl Block {
    /// Start offset in whole seconds
    pub fn start_seconds(&self) -> u64 {
        self.start_offset_millis / 1000
    }
}

/// Accumulates fragment text until the block is flushed
struct BlockBuffer {
    start_offset_millis: u64,
    texts: Vec<String>,
}

impl BlockBuffer {
    fn open(fragment: &CaptionFragment) -> Self {
        Self {
            start_offset_millis: fragment.offset_millis,
            texts: Vec::new(),
        }
    }

    fn push(&mut self, fragment: &CaptionFragment) {
        self.texts.push(fragment.text.trim().to_string());
    }

    fn into_block(self) -> Block {
        Block {
            start_offset_millis: self.start_offset_millis,
            fragment_count: self.texts.len(),
            merged_text: self.texts.join(" "),
        }
    }
}

/// Partition fragments into blocks of `cadence` fragments each
pub fn segment(fragments: &[CaptionFragment], cadence: Cadence, mode: SegmentMode) -> Vec<Block> {
    match mode {
        SegmentMode::Markdown => segment_markdown(fragments, cadence.get()),
        SegmentMode::Interactive => segment_interactive(fragments, cadence.get()),
    }
}

fn segment_markdown(fragments: &[CaptionFragment], cadence: usize) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(fragments.len().div_ceil(cadence));
    let mut current: Option<BlockBuffer> = None;

    for (i, fragment) in fragments.iter().enumerate() {
        if i % cadence == 0 {
            current = Some(BlockBuffer::open(fragment));
        }

        if let Some(buffer) = current.as_mut() {
            buffer.push(fragment);
        }

        if (i + 1) % cadence == 0 {
            if let Some(buffer) = current.take() {
                blocks.push(buffer.into_block());
            }
        }
    }

    // Short final run without a closing paragraph break
    if let Some(buffer) = current.take() {
        blocks.push(buffer.into_block());
    }

    blocks
}

fn segment_interactive(fragments: &[CaptionFragment], cadence: usize) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(fragments.len().div_ceil(cadence));
    let mut iter = fragments.iter().enumerate();

    let Some((_, first)) = iter.next() else {
        return blocks;
    };

    let mut buffer = BlockBuffer::open(first);
    buffer.push(first);

    for (i, fragment) in iter {
        if i % cadence == 0 {
            let finished = std::mem::replace(&mut buffer, BlockBuffer::open(fragment));
            blocks.push(finished.into_block());
        }
        buffer.push(fragment);
    }

    blocks.push(buffer.into_block());
    blocks
}
