// Copyright 2026 The Chisel Project
// SPDX-License-Identifier: Apache-2.0

// Artifact emitter
//
// Maps parser events to artifact lifecycle operations, preserving one
// stable identifier per block. Exactly one create and one complete are
// produced per id, with appends strictly ordered between them.

use uuid::Uuid;

use crate::artifact::{language_display_name, AgentEvent};
use crate::fence::ParserEvent;

/// Turns the parser's event sequence into externally visible artifact
/// operations.
pub struct ArtifactEmitter {
    /// Identifier of the currently open artifact, if any.
    open: Option<Uuid>,
}

impl ArtifactEmitter {
    pub fn new() -> Self {
        Self { open: None }
    }

    /// Map one parser event to its externally visible operations.
    pub fn handle(&mut self, event: ParserEvent) -> Vec<AgentEvent> {
        match event {
            ParserEvent::Text(text) => vec![AgentEvent::Text(text)],
            ParserEvent::BlockOpened { language, code } => {
                let id = Uuid::new_v4();
                let name = language_display_name(&language);
                tracing::debug!(%id, language = %language, "artifact opened");
                self.open = Some(id);
                vec![AgentEvent::ArtifactCreated {
                    id,
                    name,
                    content: format!("```{language}\n{code}"),
                }]
            }
            ParserEvent::BlockAppended(text) => match self.open {
                Some(id) => vec![AgentEvent::ArtifactAppended { id, text }],
                // Parser invariant: appends only arrive while a block is
                // open.
                None => Vec::new(),
            },
            ParserEvent::BlockClosed => match self.open.take() {
                Some(id) => {
                    tracing::debug!(%id, "artifact completed");
                    vec![AgentEvent::ArtifactCompleted { id }]
                }
                None => Vec::new(),
            },
        }
    }
}

impl Default for ArtifactEmitter {
    fn default() -> Self {
        Self::new()
    }
}
