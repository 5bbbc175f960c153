// Copyright 2026 The Chisel Project
// SPDX-License-Identifier: Apache-2.0

// Canonical artifact and event representation
//
// These are the values the pipeline hands to the event sink. The sink
// (the host runtime) owns persistence; the pipeline only produces values
// and never retains them after emission.

use serde::Serialize;
use uuid::Uuid;

/// A named, independently addressable unit of generated code, distinct
/// from ordinary relayed text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    pub id: Uuid,
    pub name: String,
    pub content: String,
}

/// Externally visible output of one invocation, in emission order.
///
/// Artifact operations for a given id are strictly ordered: exactly one
/// `ArtifactCreated`, zero or more `ArtifactAppended`, then one
/// `ArtifactCompleted`. Blocks never overlap, so operations across
/// different ids are also in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AgentEvent {
    /// Prose relayed verbatim; no artifact semantics.
    Text(String),
    /// A new artifact. The id stays stable for the artifact's lifetime.
    ArtifactCreated {
        id: Uuid,
        name: String,
        content: String,
    },
    /// Incremental content for an existing artifact. Carries only the
    /// delta; the consumer appends rather than replaces.
    ArtifactAppended { id: Uuid, text: String },
    /// The artifact is closed; no further updates carry this id.
    ArtifactCompleted { id: Uuid },
    /// The invocation finished; carries the full accumulated response.
    Completed { response_text: String },
    /// Terminal failure, surfaced verbatim.
    Failed { message: String },
}

/// A user request to modify a character range of previously produced
/// code.
///
/// Consumed only for prompt construction; it never alters parser state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditRequest {
    /// The stored artifact text the selection points into.
    pub artifact_text: String,
    pub start_index: usize,
    pub end_index: usize,
}

/// Default artifact name for a language label: "Python Code",
/// "Text Code", and so on.
pub fn language_display_name(language: &str) -> String {
    format!("{} Code", title_case(language))
}

/// Uppercase the first letter of each word, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if ch.is_alphabetic() && !prev_alpha {
            out.extend(ch.to_uppercase());
        } else if ch.is_alphabetic() {
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
        prev_alpha = ch.is_alphabetic();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // 1. Display names title-case the language label
    // ---------------------------------------------------------------

    #[test]
    fn display_name_for_lowercase_language() {
        assert_eq!(language_display_name("python"), "Python Code");
    }

    #[test]
    fn display_name_for_default_language() {
        assert_eq!(language_display_name("text"), "Text Code");
    }

    #[test]
    fn display_name_preserves_non_alphabetic_characters() {
        assert_eq!(language_display_name("c++"), "C++ Code");
        assert_eq!(language_display_name("objective-c"), "Objective-C Code");
    }

    #[test]
    fn display_name_lowercases_shouting_labels() {
        assert_eq!(language_display_name("PYTHON"), "Python Code");
    }

    // ---------------------------------------------------------------
    // 2. Edit requests are plain data
    // ---------------------------------------------------------------

    #[test]
    fn edit_request_holds_selection_offsets() {
        let edit = EditRequest {
            artifact_text: "def f():\n    pass\n".to_string(),
            start_index: 4,
            end_index: 5,
        };
        assert_eq!(&edit.artifact_text[edit.start_index..edit.end_index], "f");
    }

    // ---------------------------------------------------------------
    // 3. Events serialize for the stdout sink
    // ---------------------------------------------------------------

    #[test]
    fn text_event_serializes() {
        let event = AgentEvent::Text("hello".to_string());
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("hello"));
    }

    #[test]
    fn artifact_created_event_serializes_with_id() {
        let id = Uuid::new_v4();
        let event = AgentEvent::ArtifactCreated {
            id,
            name: "Python Code".to_string(),
            content: "```python\n".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(&id.to_string()));
        assert!(json.contains("Python Code"));
    }
}
