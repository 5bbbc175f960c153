// Copyright 2026 The Chisel Project
// SPDX-License-Identifier: Apache-2.0

// Primary block selection and display naming
//
// Picks the largest extracted block and derives a human-readable name
// from a leading single-line comment, skipping copyright notices.

use regex::Regex;

use super::types::CodeBlock;
use crate::artifact::language_display_name;

/// A comment-derived name of this many characters or more is rejected.
const MAX_NAME_CHARS: usize = 50;

/// How many leading code lines are inspected for a name.
const NAME_SCAN_LINES: usize = 3;

/// The chosen primary block, re-wrapped and named for emission.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimarySelection {
    pub name: String,
    /// The block's code re-wrapped in its fence markers with language
    /// tag.
    pub content: String,
    pub language: String,
    pub code_len: usize,
}

pub struct BlockSelector {
    comment: Regex,
}

impl BlockSelector {
    pub fn new() -> Self {
        // `#` or `//` single-line comment with a non-empty remainder.
        Self {
            comment: Regex::new(r"^\s*(?:#|//)\s*(.+)$").expect("comment pattern is valid"),
        }
    }

    /// Choose the block with the longest code; ties keep the leftmost.
    /// Returns `None` when no blocks were extracted.
    pub fn select_primary(&self, blocks: &[CodeBlock]) -> Option<PrimarySelection> {
        let mut best: Option<&CodeBlock> = None;
        for block in blocks {
            match best {
                // Strictly greater, so an equal-length later block never
                // displaces an earlier one.
                Some(current) if block.code.len() > current.code.len() => best = Some(block),
                None => best = Some(block),
                _ => {}
            }
        }
        let block = best?;
        Some(PrimarySelection {
            name: self.derive_name(block),
            content: format!("```{}\n{}\n```", block.language, block.code),
            language: block.language.clone(),
            code_len: block.code.len(),
        })
    }

    /// A short leading comment names the artifact, unless it looks like
    /// a copyright notice. Falls back to "<Language> Code".
    fn derive_name(&self, block: &CodeBlock) -> String {
        for line in block.code.lines().take(NAME_SCAN_LINES) {
            let Some(caps) = self.comment.captures(line) else {
                continue;
            };
            let Some(candidate) = caps.get(1) else {
                continue;
            };
            let candidate = candidate.as_str().trim();
            // Characters, not bytes: a multibyte comment must not hit
            // the cutoff early.
            if candidate.chars().count() < MAX_NAME_CHARS
                && !candidate.to_lowercase().starts_with("copyright")
            {
                return candidate.to_string();
            }
        }
        language_display_name(&block.language)
    }
}

impl Default for BlockSelector {
    fn default() -> Self {
        Self::new()
    }
}
