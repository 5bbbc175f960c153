// Copyright 2026 The Chisel Project
// SPDX-License-Identifier: Apache-2.0

// Buffered block extraction
//
// Single-pass regex scan over fully assembled text. Unlike the
// streaming parser's flush, an unterminated block is not reported: the
// buffered path only ever sees complete text, so a missing closing
// fence is a true syntax error in the upstream output rather than a
// truncation artifact.

use regex::Regex;

use super::types::{CodeBlock, DEFAULT_LANGUAGE};

/// Triple backtick, optional language token, newline, non-greedy body
/// (newlines included), closing triple backtick.
const BLOCK_PATTERN: &str = r"(?s)```(\w+)?\n(.*?)```";

/// Finds every complete fenced block in assembled text.
pub struct BlockExtractor {
    pattern: Regex,
}

impl BlockExtractor {
    pub fn new() -> Self {
        // The pattern is a compile-time constant.
        Self {
            pattern: Regex::new(BLOCK_PATTERN).expect("block pattern is valid"),
        }
    }

    /// Return every complete fenced block, left to right by offset.
    pub fn extract(&self, text: &str) -> Vec<CodeBlock> {
        let mut blocks = Vec::new();
        for caps in self.pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let language = caps
                .get(1)
                .map_or(DEFAULT_LANGUAGE, |m| m.as_str())
                .to_string();
            let code = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
            blocks.push(CodeBlock {
                language,
                code,
                start: whole.start(),
                end: whole.end(),
            });
        }
        blocks
    }
}

impl Default for BlockExtractor {
    fn default() -> Self {
        Self::new()
    }
}
