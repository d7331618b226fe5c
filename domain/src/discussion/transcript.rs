//! Transcript of the persona turns within one round

use crate::persona::PersonaId;
use serde::{Deserialize, Serialize};

/// One persona reply inside a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub persona: PersonaId,
    pub persona_name: String,
    pub reply: String,
}

impl Turn {
    /// `"{name} said: {reply}"`
    pub fn render(&self) -> String {
        format!("{} said: {}", self.persona_name, self.reply)
    }
}

/// Ordered turns of the current round. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTranscript {
    turns: Vec<Turn>,
}

impl RoundTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        persona: PersonaId,
        persona_name: impl Into<String>,
        reply: impl Into<String>,
    ) {
        self.turns.push(Turn {
            persona,
            persona_name: persona_name.into(),
            reply: reply.into(),
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// All turns rendered and separated by blank lines
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(Turn::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
