//! Pending input for multi-step chat dialogs
//!
//! When a chat command needs free-text follow-up (a topic, a persona name, a
//! system prompt), the session remembers what the next plain message means.

use crate::persona::PersonaId;
use serde::{Deserialize, Serialize};

/// Identifier of an external conversation context (a chat, a terminal)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(String);

impl ContextId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContextId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the next free-text message from a context answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "awaiting", rename_all = "snake_case")]
pub enum PendingInput {
    /// `/run` was issued; the next message is the topic
    Topic,
    /// `/prompt <id>` was issued; the next message replaces that persona's prompt
    SystemPrompt { persona: PersonaId },
    /// `/newpersona` first step
    PersonaName,
    /// Second step of `/newpersona`, or `/editpersona <id>`
    PersonaPrompt {
        name: String,
        editing: Option<PersonaId>,
    },
}

impl PendingInput {
    /// Question shown to the user when this state is armed
    pub fn prompt_text(&self) -> String {
        match self {
            PendingInput::Topic => "Enter the discussion topic:".to_string(),
            PendingInput::SystemPrompt { persona } => {
                format!("Enter the new system prompt for '{}':", persona)
            }
            PendingInput::PersonaName => "Enter a name for the new persona:".to_string(),
            PendingInput::PersonaPrompt { name, .. } => {
                format!("Enter the system prompt for '{}':", name)
            }
        }
    }

    /// Whether answering this state completes the dialog
    pub fn is_final_step(&self) -> bool {
        !matches!(self, PendingInput::PersonaName)
    }
}
