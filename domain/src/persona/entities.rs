//! Persona entities and identifiers

use serde::{Deserialize, Serialize};

/// Identifier of a persona (built-in or custom)
///
/// Ids are opaque strings. Built-ins use fixed ids (`analyst`, `summarizer`,
/// ...); custom personas get generated `custom-<n>` ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaId(String);

impl PersonaId {
    /// Id of the designated synthesizer persona
    pub const SUMMARIZER: &'static str = "summarizer";

    /// Prefix used for generated custom persona ids
    pub const CUSTOM_PREFIX: &'static str = "custom-";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The synthesizer's id
    pub fn summarizer() -> Self {
        Self::new(Self::SUMMARIZER)
    }

    /// Build the id of the n-th custom persona
    pub fn custom(n: u32) -> Self {
        Self(format!("{}{}", Self::CUSTOM_PREFIX, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_summarizer(&self) -> bool {
        self.0 == Self::SUMMARIZER
    }
}

impl std::fmt::Display for PersonaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PersonaId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PersonaId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Where a persona definition comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonaOrigin {
    BuiltIn,
    Custom,
}

/// User-editable part of a persona definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaProfile {
    /// Display name
    pub name: String,
    /// System prompt describing the persona's role
    pub system_prompt: String,
}

impl PersonaProfile {
    pub fn new(name: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
        }
    }
}

/// A fully resolved persona, ready to be prompted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: PersonaId,
    pub name: String,
    pub system_prompt: String,
    pub origin: PersonaOrigin,
}

impl Persona {
    pub fn is_custom(&self) -> bool {
        self.origin == PersonaOrigin::Custom
    }
}
