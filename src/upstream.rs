// Copyright 2026 The Chisel Project
// SPDX-License-Identifier: Apache-2.0

// Upstream chat-completions client
//
// One streaming POST per invocation to <api_base>/chat/completions
// with bearer auth. The HTTP client sits behind a trait so the
// pipeline can be driven by scripted responses in tests. No retries:
// a single attempt per invocation.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::Stream;
use futures_util::TryStreamExt;
use serde::Serialize;

/// Deadline for establishing the upstream connection. The stream
/// itself is unbounded once established.
pub const CONNECT_TIMEOUT_SECS: u64 = 60;

/// One message in the chat-completions request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// JSON body for the streaming chat-completions call.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl CompletionRequest {
    pub fn new(
        model: impl Into<String>,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.into(),
                },
                ChatMessage {
                    role: "user",
                    content: user.into(),
                },
            ],
            stream: true,
        }
    }
}

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// An established upstream stream.
pub struct HttpResponse {
    pub status: u16,
    pub body: ByteStream,
}

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("upstream request failed: {0}")]
    Transport(String),

    #[error("upstream request timed out: {0}")]
    Timeout(String),

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Sends the streaming completion request to the upstream service.
#[async_trait]
pub trait HttpSender: Send + Sync {
    async fn send(
        &self,
        base_url: &str,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<HttpResponse, HttpError>;
}

/// Production sender backed by reqwest.
pub struct ReqwestHttpSender {
    client: reqwest::Client,
}

impl ReqwestHttpSender {
    pub fn new() -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| HttpError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpSender for ReqwestHttpSender {
    async fn send(
        &self,
        base_url: &str,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<HttpResponse, HttpError> {
        let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HttpError::Timeout(e.to_string())
                } else {
                    HttpError::Transport(e.to_string())
                }
            })?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(HttpError::Status { status, body });
        }

        let body = resp
            .bytes_stream()
            .map_err(|e| HttpError::Transport(e.to_string()));
        Ok(HttpResponse {
            status,
            body: Box::pin(body),
        })
    }
}
