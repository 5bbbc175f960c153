// Copyright 2026 The Chisel Project
// SPDX-License-Identifier: Apache-2.0

// Invocation pipeline
//
// Wires one conversation turn end to end:
// - Resolve the LLM endpoint (short-circuit before any network call)
// - Build the prompt (plain, or the edit-request template)
// - Stream the chat-completions response
// - Live strategy: fence parser -> artifact emitter -> sink
// - Buffered strategy: full-text extraction + primary selection
// - Surface a single Completed or Failed marker
//
// Each call to `run` owns its parser state and connection exclusively;
// nothing survives the invocation.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use uuid::Uuid;

use crate::artifact::{AgentEvent, EditRequest};
use crate::config::{Config, LlmResolution, LlmService, Strategy};
use crate::emitter::ArtifactEmitter;
use crate::fence::{BlockExtractor, BlockSelector, StreamingFenceParser};
use crate::sse::{parse_sse_line, LineBuffer, SseLine};
use crate::upstream::{CompletionRequest, HttpError, HttpSender};

/// User-visible message when no LLM section is configured.
pub const ERR_SERVICE_UNAVAILABLE: &str = "LLM service not available";

/// User-visible message when no "default" fulfillment exists.
pub const ERR_CONFIG_NOT_FOUND: &str = "LLM config not found";

/// Signals that the event consumer has gone away.
///
/// The pipeline stops consuming upstream chunks as soon as it sees
/// this; a cancelled run never fabricates a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkClosed;

/// Receives events in emission order. The host runtime implements this
/// and owns persistence.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: AgentEvent) -> Result<(), SinkClosed>;
}

/// One inbound conversation turn.
#[derive(Debug, Clone)]
pub struct TurnInput {
    pub user_message: String,
    /// Present when the user selected a range of stored code to edit.
    pub edit_request: Option<EditRequest>,
}

pub struct Agent {
    config: Arc<Config>,
    http: Arc<dyn HttpSender>,
    // Compiled once; the buffered pass reuses them across invocations.
    extractor: BlockExtractor,
    selector: BlockSelector,
}

impl Agent {
    pub fn new(config: Arc<Config>, http: Arc<dyn HttpSender>) -> Self {
        Self {
            config,
            http,
            extractor: BlockExtractor::new(),
            selector: BlockSelector::new(),
        }
    }

    /// Run one invocation against the configured upstream.
    ///
    /// Returns `Err(SinkClosed)` only when the consumer went away;
    /// every other outcome surfaces as a `Completed` or `Failed` event.
    pub async fn run(&self, turn: TurnInput, sink: &dyn EventSink) -> Result<(), SinkClosed> {
        let service = match &self.config.llm {
            LlmResolution::Resolved(service) => service.clone(),
            LlmResolution::Unavailable => {
                tracing::error!("no LLM service configured");
                return sink
                    .emit(AgentEvent::Failed {
                        message: ERR_SERVICE_UNAVAILABLE.to_string(),
                    })
                    .await;
            }
            LlmResolution::MissingDefault => {
                tracing::error!("LLM fulfillments present but no \"default\" entry");
                return sink
                    .emit(AgentEvent::Failed {
                        message: ERR_CONFIG_NOT_FOUND.to_string(),
                    })
                    .await;
            }
        };

        let prompt = build_prompt(&turn);
        let request = CompletionRequest::new(
            service.api_model.clone(),
            self.config.system_prompt.clone(),
            prompt,
        );

        tracing::info!(
            model = %service.api_model,
            strategy = ?self.config.strategy,
            "invocation started"
        );

        match self.stream_turn(&service, &request, sink).await? {
            Ok(response_text) => {
                if matches!(self.config.strategy, Strategy::Buffered | Strategy::Both) {
                    self.buffered_pass(&response_text, sink).await?;
                }
                tracing::info!(chars = response_text.len(), "invocation complete");
                sink.emit(AgentEvent::Completed { response_text }).await
            }
            Err(e) => {
                tracing::error!(error = %e, "upstream call failed");
                sink.emit(AgentEvent::Failed {
                    message: format!("Error: {e}"),
                })
                .await
            }
        }
    }

    /// Drive the SSE stream to completion. The outer result is sink
    /// liveness; the inner result is the transport outcome.
    async fn stream_turn(
        &self,
        service: &LlmService,
        request: &CompletionRequest,
        sink: &dyn EventSink,
    ) -> Result<Result<String, HttpError>, SinkClosed> {
        let response = match self
            .http
            .send(&service.api_base, &service.api_key, request)
            .await
        {
            Ok(response) => response,
            Err(e) => return Ok(Err(e)),
        };
        tracing::debug!(status = response.status, "upstream stream established");

        let live = matches!(self.config.strategy, Strategy::Live | Strategy::Both);
        let mut parser = StreamingFenceParser::new();
        let mut emitter = ArtifactEmitter::new();
        let mut lines = LineBuffer::new();
        let mut response_text = String::new();
        let mut done = false;

        let mut body = response.body;
        'stream: while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                // Mid-stream disconnect is terminal for the invocation.
                Err(e) => return Ok(Err(e)),
            };
            lines.push(&chunk);
            while let Some(line) = lines.next_line() {
                if self
                    .handle_line(&line, live, &mut parser, &mut emitter, &mut response_text, sink)
                    .await?
                {
                    done = true;
                    break 'stream;
                }
            }
        }

        // A trailing line without a newline still counts, unless the
        // stream already terminated with [DONE].
        if !done {
            if let Some(line) = lines.take_remainder() {
                self.handle_line(&line, live, &mut parser, &mut emitter, &mut response_text, sink)
                    .await?;
            }
        }

        if live {
            for event in parser.flush() {
                for op in emitter.handle(event) {
                    sink.emit(op).await?;
                }
            }
        }

        Ok(Ok(response_text))
    }

    /// Process one SSE line; returns true on the [DONE] terminator.
    async fn handle_line(
        &self,
        line: &str,
        live: bool,
        parser: &mut StreamingFenceParser,
        emitter: &mut ArtifactEmitter,
        response_text: &mut String,
        sink: &dyn EventSink,
    ) -> Result<bool, SinkClosed> {
        match parse_sse_line(line) {
            Some(SseLine::Done) => Ok(true),
            Some(SseLine::Content(text)) => {
                response_text.push_str(&text);
                if live {
                    for event in parser.process(&text) {
                        for op in emitter.handle(event) {
                            sink.emit(op).await?;
                        }
                    }
                }
                Ok(false)
            }
            Some(SseLine::Skip) | None => Ok(false),
        }
    }

    /// The buffered summary pass over the fully assembled text.
    async fn buffered_pass(
        &self,
        response_text: &str,
        sink: &dyn EventSink,
    ) -> Result<(), SinkClosed> {
        // In Both mode the live path already relayed the prose; only a
        // pure buffered run delivers the text here.
        if self.config.strategy == Strategy::Buffered {
            sink.emit(AgentEvent::Text(response_text.to_string())).await?;
        }

        let blocks = self.extractor.extract(response_text);
        let Some(primary) = self.selector.select_primary(&blocks) else {
            // No fenced block is not an error: the message still went
            // out, just without an artifact.
            tracing::debug!("no fenced block in response");
            return Ok(());
        };

        tracing::info!(
            name = %primary.name,
            language = %primary.language,
            code_len = primary.code_len,
            "primary block selected"
        );

        let id = Uuid::new_v4();
        sink.emit(AgentEvent::ArtifactCreated {
            id,
            name: primary.name,
            content: primary.content,
        })
        .await?;
        sink.emit(AgentEvent::ArtifactCompleted { id }).await
    }
}

/// Construct the upstream user prompt for this turn.
///
/// With an edit request in hand, the selected range plus the full
/// original code are embedded alongside the user's instruction; the
/// model is asked for the complete updated code.
fn build_prompt(turn: &TurnInput) -> String {
    match &turn.edit_request {
        None => turn.user_message.clone(),
        Some(edit) => {
            let selected = selected_range(&edit.artifact_text, edit.start_index, edit.end_index);
            tracing::debug!(selected_chars = selected.len(), "building edit prompt");
            format!(
                "Edit this code:\n\n\
                 SELECTED:\n```\n{selected}\n```\n\n\
                 FULL CODE:\n```\n{}\n```\n\n\
                 USER REQUEST: {}\n\n\
                 Return ONLY the complete updated code in a code block (```language).",
                edit.artifact_text, turn.user_message
            )
        }
    }
}

/// Clamp a selection to the text so garbled offsets cannot panic. Out
/// of range or mid-character offsets back off to the nearest valid
/// boundary.
fn selected_range(text: &str, start: usize, end: usize) -> &str {
    let mut start = start.min(text.len());
    let mut end = end.min(text.len());
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    if end < start {
        end = start;
    }
    &text[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // Prompt construction
    // ---------------------------------------------------------------

    #[test]
    fn plain_turn_uses_user_message_verbatim() {
        let turn = TurnInput {
            user_message: "write a sort function".to_string(),
            edit_request: None,
        };
        assert_eq!(build_prompt(&turn), "write a sort function");
    }

    #[test]
    fn edit_turn_embeds_selection_and_full_code() {
        let turn = TurnInput {
            user_message: "rename the variable".to_string(),
            edit_request: Some(EditRequest {
                artifact_text: "let count = 0;\nlet total = 1;".to_string(),
                start_index: 4,
                end_index: 9,
            }),
        };
        let prompt = build_prompt(&turn);
        assert!(prompt.contains("SELECTED:\n```\ncount\n```"));
        assert!(prompt.contains("FULL CODE:\n```\nlet count = 0;\nlet total = 1;\n```"));
        assert!(prompt.contains("USER REQUEST: rename the variable"));
    }

    // ---------------------------------------------------------------
    // Selection clamping
    // ---------------------------------------------------------------

    #[test]
    fn out_of_range_offsets_are_clamped() {
        assert_eq!(selected_range("short", 2, 100), "ort");
        assert_eq!(selected_range("short", 100, 200), "");
    }

    #[test]
    fn inverted_offsets_yield_empty_selection() {
        assert_eq!(selected_range("abcdef", 4, 2), "");
    }

    #[test]
    fn mid_character_offsets_back_off_to_boundaries() {
        // "é" is two bytes; offset 1 falls inside it.
        let text = "étage";
        assert_eq!(selected_range(text, 1, 2), "é");
    }
}
