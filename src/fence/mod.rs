// Copyright 2026 The Chisel Project
// SPDX-License-Identifier: Apache-2.0

// Fenced-code-block extraction
//
// Responsibilities:
// - Detect ``` fences incrementally as chunks arrive (live strategy)
// - Extract complete blocks from fully assembled text (buffered strategy)
// - Pick the primary block and derive a display name
// - Preserve strict event ordering and the single-open-block invariant

mod extractor;
mod parser;
mod selector;
mod types;

pub use extractor::BlockExtractor;
pub use parser::StreamingFenceParser;
pub use selector::{BlockSelector, PrimarySelection};
pub use types::{CodeBlock, ParserEvent, DEFAULT_LANGUAGE, FENCE_MARKER};
