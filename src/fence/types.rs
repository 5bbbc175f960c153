// Copyright 2026 The Chisel Project
// SPDX-License-Identifier: Apache-2.0

// Fence extraction types
//
// Core types shared by the streaming parser, the buffered extractor,
// and the primary-block selector.

/// The literal three-character marker that delimits a fenced code block.
pub const FENCE_MARKER: &str = "```";

/// Language label used when a fence declares no language.
pub const DEFAULT_LANGUAGE: &str = "text";

/// Events produced by the streaming fence parser, in chunk order.
#[derive(Debug, Clone, PartialEq)]
pub enum ParserEvent {
    /// Prose outside any code block, relayed verbatim.
    Text(String),
    /// A fence opened: the declared language (default "text") and any
    /// code that arrived in the same chunk.
    BlockOpened { language: String, code: String },
    /// More code for the currently open block. Deltas, not cumulative.
    BlockAppended(String),
    /// The open block closed: closing fence seen, or stream truncated.
    BlockClosed,
}

/// A fenced code block found in fully assembled text.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    pub language: String,
    /// Interior text with fences removed and surrounding whitespace
    /// trimmed.
    pub code: String,
    /// Byte offset of the opening fence in the source text.
    pub start: usize,
    /// Byte offset one past the closing fence.
    pub end: usize,
}
