// Copyright 2026 The Chisel Project
// SPDX-License-Identifier: Apache-2.0

// SSE line decoding
//
// The upstream service emits `data: `-prefixed lines, each carrying a
// JSON object with choices[0].delta.content, terminated by a line whose
// payload is the literal [DONE]. One malformed line must not lose the
// rest of the response: JSON that fails to parse is skipped.

/// What one SSE line means to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// A text delta extracted from `choices[0].delta.content`.
    Content(String),
    /// Stream terminator (`data: [DONE]`).
    Done,
    /// A data line with no usable content: role-only delta, empty
    /// delta, or malformed JSON.
    Skip,
}

/// Decode one line from the upstream response body.
///
/// Lines without a `data:` prefix (blank separators, `:` comments,
/// anything else) return `None`.
pub fn parse_sse_line(line: &str) -> Option<SseLine> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') {
        return None;
    }
    let data = trimmed
        .strip_prefix("data: ")
        .or_else(|| trimmed.strip_prefix("data:"))?;

    if data.trim() == "[DONE]" {
        return Some(SseLine::Done);
    }

    let json: serde_json::Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => {
            // Recoverable: drop the line, keep the stream.
            tracing::debug!(error = %e, "skipping malformed SSE line");
            return Some(SseLine::Skip);
        }
    };

    let content = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("delta"))
        .and_then(|d| d.get("content"))
        .and_then(|v| v.as_str());

    match content {
        Some(text) if !text.is_empty() => Some(SseLine::Content(text.to_string())),
        _ => Some(SseLine::Skip),
    }
}

/// Carries partial lines across arbitrary chunk boundaries.
///
/// Transport chunks are not aligned to lines. `push` appends raw bytes,
/// `next_line` drains complete lines, and `take_remainder` hands back a
/// trailing unterminated line once the stream has ended.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));
    }

    /// Remove and return the next complete line, without its newline.
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.buffer.find('\n')?;
        let line = self.buffer[..pos].to_string();
        self.buffer.drain(..=pos);
        Some(line)
    }

    /// Any trailing partial line once no more chunks will arrive.
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // 1. Content deltas
    // ---------------------------------------------------------------

    #[test]
    fn content_delta_is_extracted() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hello"}}]}"#;
        assert_eq!(
            parse_sse_line(line),
            Some(SseLine::Content("Hello".to_string()))
        );
    }

    #[test]
    fn data_prefix_without_space_is_accepted() {
        let line = r#"data:{"choices":[{"delta":{"content":"x"}}]}"#;
        assert_eq!(parse_sse_line(line), Some(SseLine::Content("x".to_string())));
    }

    // ---------------------------------------------------------------
    // 2. Terminator and non-data lines
    // ---------------------------------------------------------------

    #[test]
    fn done_token_terminates() {
        assert_eq!(parse_sse_line("data: [DONE]"), Some(SseLine::Done));
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        assert_eq!(parse_sse_line(""), None);
        assert_eq!(parse_sse_line("   "), None);
        assert_eq!(parse_sse_line(": keep-alive"), None);
    }

    #[test]
    fn non_data_line_is_ignored() {
        assert_eq!(parse_sse_line("event: message"), None);
    }

    // ---------------------------------------------------------------
    // 3. Recoverable decode failures
    // ---------------------------------------------------------------

    #[test]
    fn malformed_json_is_skipped_not_fatal() {
        assert_eq!(parse_sse_line("data: {not json"), Some(SseLine::Skip));
    }

    #[test]
    fn role_only_delta_is_skipped() {
        let line = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_sse_line(line), Some(SseLine::Skip));
    }

    #[test]
    fn empty_content_is_skipped() {
        let line = r#"data: {"choices":[{"delta":{"content":""}}]}"#;
        assert_eq!(parse_sse_line(line), Some(SseLine::Skip));
    }

    #[test]
    fn missing_choices_is_skipped() {
        assert_eq!(parse_sse_line(r#"data: {"object":"ping"}"#), Some(SseLine::Skip));
    }

    // ---------------------------------------------------------------
    // 4. Line buffering across chunk boundaries
    // ---------------------------------------------------------------

    #[test]
    fn line_buffer_joins_split_lines() {
        let mut lines = LineBuffer::new();
        lines.push(b"data: {\"a\"");
        assert_eq!(lines.next_line(), None);
        lines.push(b":1}\ndata: [DO");
        assert_eq!(lines.next_line(), Some("data: {\"a\":1}".to_string()));
        assert_eq!(lines.next_line(), None);
        lines.push(b"NE]\n");
        assert_eq!(lines.next_line(), Some("data: [DONE]".to_string()));
        assert_eq!(lines.next_line(), None);
    }

    #[test]
    fn line_buffer_hands_back_trailing_partial_line() {
        let mut lines = LineBuffer::new();
        lines.push(b"data: [DONE]");
        assert_eq!(lines.next_line(), None);
        assert_eq!(lines.take_remainder(), Some("data: [DONE]".to_string()));
        assert_eq!(lines.take_remainder(), None);
    }
}
