//! Per-session discussion configuration
//!
//! [`DiscussionConfig`] owns every user-tunable setting of a session: the
//! discussion language, the number of rounds, which personas speak and in
//! what order, custom personas, and system prompt overrides for built-ins.
//!
//! All mutations go through methods that keep two invariants:
//!
//! - every id in `enabled_personas` resolves (built-in or custom)
//! - the synthesizer is never in `enabled_personas`

use crate::persona::{PersonaId, PersonaProfile, catalog};
use crate::quorum::{AcceptanceRule, DEFAULT_LANGUAGE, VoteKeywords};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Rounds run by a fresh configuration
pub const DEFAULT_ITERATIONS: u32 = 2;

/// Upper bound on configurable rounds
pub const MAX_ITERATIONS: u32 = 10;

/// Errors raised by configuration mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown persona: {0}")]
    UnknownPersona(PersonaId),

    #[error("The synthesizer cannot take part in a round")]
    SummarizerNotAllowed,

    #[error("Position {position} is out of range (0..{len})")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("'{0}' is not a custom persona")]
    NotCustomPersona(PersonaId),

    #[error("Persona name cannot be empty")]
    EmptyName,

    #[error("System prompt cannot be empty")]
    EmptyPrompt,

    #[error("Language cannot be empty")]
    EmptyLanguage,

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Iteration count must be between 1 and {max}, got {value}")]
    IterationsOutOfRange { value: u32, max: u32 },

    #[error("Custom persona id '{0}' is out of range")]
    CustomIdOutOfRange(PersonaId),

    #[error("No custom persona ids left")]
    CustomIdsExhausted,
}

/// Mutable configuration owned by a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionConfig {
    language: String,
    iteration_count: u32,
    enabled_personas: Vec<PersonaId>,
    custom_personas: BTreeMap<PersonaId, PersonaProfile>,
    prompt_overrides: BTreeMap<PersonaId, String>,
    strict_language: bool,
    acceptance_rule: AcceptanceRule,
    next_custom_id: u32,
}

impl Default for DiscussionConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            iteration_count: DEFAULT_ITERATIONS,
            enabled_personas: catalog::DEFAULT_ENABLED
                .iter()
                .map(|id| PersonaId::new(*id))
                .collect(),
            custom_personas: BTreeMap::new(),
            prompt_overrides: BTreeMap::new(),
            strict_language: false,
            acceptance_rule: AcceptanceRule::default(),
            next_custom_id: 1,
        }
    }
}

impl DiscussionConfig {
    // ==================== Accessors ====================

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    /// Personas in turn order. Ids may repeat.
    pub fn enabled_personas(&self) -> &[PersonaId] {
        &self.enabled_personas
    }

    pub fn custom_personas(&self) -> &BTreeMap<PersonaId, PersonaProfile> {
        &self.custom_personas
    }

    pub fn custom_persona(&self, id: &PersonaId) -> Option<&PersonaProfile> {
        self.custom_personas.get(id)
    }

    /// System prompt override for a built-in persona
    pub fn prompt_override(&self, id: &PersonaId) -> Option<&str> {
        self.prompt_overrides.get(id).map(String::as_str)
    }

    pub fn strict_language(&self) -> bool {
        self.strict_language
    }

    pub fn acceptance_rule(&self) -> AcceptanceRule {
        self.acceptance_rule
    }

    /// Vote keywords for the active language (default pair if unrecognised)
    pub fn vote_keywords(&self) -> &'static VoteKeywords {
        VoteKeywords::for_language(&self.language)
    }

    /// Whether the id resolves to a built-in or custom persona
    pub fn is_known(&self, id: &PersonaId) -> bool {
        self.custom_personas.contains_key(id) || catalog::builtin(id.as_str()).is_some()
    }

    pub fn is_enabled(&self, id: &PersonaId) -> bool {
        self.enabled_personas.contains(id)
    }

    // ==================== Builders ====================

    /// Register a custom persona under a fixed id (used when loading
    /// configuration files). Later generated ids never collide with it.
    pub fn with_custom_persona(
        mut self,
        id: PersonaId,
        profile: PersonaProfile,
    ) -> Result<Self, ConfigError> {
        Self::validate_profile(&profile)?;
        if id.is_summarizer() || catalog::builtin(id.as_str()).is_some() {
            return Err(ConfigError::NotCustomPersona(id));
        }
        if let Some(n) = id
            .as_str()
            .strip_prefix(PersonaId::CUSTOM_PREFIX)
            .and_then(|n| n.parse::<u32>().ok())
        {
            let next = n
                .checked_add(1)
                .ok_or_else(|| ConfigError::CustomIdOutOfRange(id.clone()))?;
            self.next_custom_id = self.next_custom_id.max(next);
        }
        self.custom_personas.insert(id, profile);
        Ok(self)
    }

    pub fn with_strict_language(mut self, strict: bool) -> Self {
        self.strict_language = strict;
        self
    }

    pub fn with_acceptance_rule(mut self, rule: AcceptanceRule) -> Self {
        self.acceptance_rule = rule;
        self
    }

    // ==================== Persona order ====================

    /// Replace the whole turn order
    pub fn set_enabled_personas(&mut self, ids: Vec<PersonaId>) -> Result<(), ConfigError> {
        for id in &ids {
            self.check_participant(id)?;
        }
        self.enabled_personas = ids;
        Ok(())
    }

    /// Enable a persona (appended last) or disable every occurrence of it.
    ///
    /// Returns whether the persona is enabled afterwards.
    pub fn toggle_persona(&mut self, id: &PersonaId) -> Result<bool, ConfigError> {
        self.check_participant(id)?;
        if self.is_enabled(id) {
            self.enabled_personas.retain(|p| p != id);
            Ok(false)
        } else {
            self.enabled_personas.push(id.clone());
            Ok(true)
        }
    }

    /// Swap the entry at `index` with its predecessor. No-op at the top.
    pub fn move_up(&mut self, index: usize) -> Result<(), ConfigError> {
        self.check_position(index)?;
        if index > 0 {
            self.enabled_personas.swap(index, index - 1);
        }
        Ok(())
    }

    /// Swap the entry at `index` with its successor. No-op at the bottom.
    pub fn move_down(&mut self, index: usize) -> Result<(), ConfigError> {
        self.check_position(index)?;
        if index + 1 < self.enabled_personas.len() {
            self.enabled_personas.swap(index, index + 1);
        }
        Ok(())
    }

    /// Insert another turn for the persona at `index`, right after it
    pub fn duplicate_at(&mut self, index: usize) -> Result<(), ConfigError> {
        self.check_position(index)?;
        let id = self.enabled_personas[index].clone();
        self.enabled_personas.insert(index + 1, id);
        Ok(())
    }

    /// Remove the turn at `index`
    pub fn remove_at(&mut self, index: usize) -> Result<PersonaId, ConfigError> {
        self.check_position(index)?;
        Ok(self.enabled_personas.remove(index))
    }

    // ==================== Custom personas ====================

    /// Create a custom persona and enable it. Returns the generated id.
    pub fn add_custom_persona(
        &mut self,
        name: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Result<PersonaId, ConfigError> {
        let profile = PersonaProfile::new(name.into().trim(), system_prompt.into().trim());
        Self::validate_profile(&profile)?;

        let mut n = self.next_custom_id;
        let id = loop {
            let id = PersonaId::custom(n);
            if !self.custom_personas.contains_key(&id) {
                break id;
            }
            n = n.checked_add(1).ok_or(ConfigError::CustomIdsExhausted)?;
        };
        self.next_custom_id = n.checked_add(1).ok_or(ConfigError::CustomIdsExhausted)?;

        self.custom_personas.insert(id.clone(), profile);
        if !self.is_enabled(&id) {
            self.enabled_personas.push(id.clone());
        }
        Ok(id)
    }

    /// Change a custom persona's name and/or prompt
    pub fn edit_custom_persona(
        &mut self,
        id: &PersonaId,
        name: Option<String>,
        system_prompt: Option<String>,
    ) -> Result<(), ConfigError> {
        let profile = self
            .custom_personas
            .get_mut(id)
            .ok_or_else(|| ConfigError::NotCustomPersona(id.clone()))?;

        let mut updated = profile.clone();
        if let Some(name) = name {
            updated.name = name.trim().to_string();
        }
        if let Some(prompt) = system_prompt {
            updated.system_prompt = prompt.trim().to_string();
        }
        Self::validate_profile(&updated)?;
        *profile = updated;
        Ok(())
    }

    /// Delete a custom persona, removing all of its turns
    pub fn delete_custom_persona(&mut self, id: &PersonaId) -> Result<PersonaProfile, ConfigError> {
        let profile = self
            .custom_personas
            .remove(id)
            .ok_or_else(|| ConfigError::NotCustomPersona(id.clone()))?;
        self.enabled_personas.retain(|p| p != id);
        Ok(profile)
    }

    // ==================== Scalars ====================

    pub fn set_language(&mut self, language: &str) -> Result<(), ConfigError> {
        let language = language.trim();
        if language.is_empty() {
            return Err(ConfigError::EmptyLanguage);
        }
        match VoteKeywords::lookup(language) {
            Some(keywords) => self.language = keywords.language.to_string(),
            None if self.strict_language => {
                return Err(ConfigError::UnsupportedLanguage(language.to_string()));
            }
            None => self.language = language.to_string(),
        }
        Ok(())
    }

    pub fn set_iteration_count(&mut self, count: u32) -> Result<(), ConfigError> {
        if !(1..=MAX_ITERATIONS).contains(&count) {
            return Err(ConfigError::IterationsOutOfRange {
                value: count,
                max: MAX_ITERATIONS,
            });
        }
        self.iteration_count = count;
        Ok(())
    }

    /// Set the system prompt of any persona, the synthesizer included.
    ///
    /// Custom personas are edited in place; built-ins get an override.
    pub fn set_system_prompt(
        &mut self,
        id: &PersonaId,
        system_prompt: &str,
    ) -> Result<(), ConfigError> {
        let prompt = system_prompt.trim();
        if prompt.is_empty() {
            return Err(ConfigError::EmptyPrompt);
        }
        if let Some(profile) = self.custom_personas.get_mut(id) {
            profile.system_prompt = prompt.to_string();
            return Ok(());
        }
        if catalog::builtin(id.as_str()).is_none() {
            return Err(ConfigError::UnknownPersona(id.clone()));
        }
        self.prompt_overrides.insert(id.clone(), prompt.to_string());
        Ok(())
    }

    // ==================== Validation helpers ====================

    fn check_participant(&self, id: &PersonaId) -> Result<(), ConfigError> {
        if id.is_summarizer() {
            return Err(ConfigError::SummarizerNotAllowed);
        }
        if !self.is_known(id) {
            return Err(ConfigError::UnknownPersona(id.clone()));
        }
        Ok(())
    }

    fn check_position(&self, position: usize) -> Result<(), ConfigError> {
        let len = self.enabled_personas.len();
        if position >= len {
            return Err(ConfigError::PositionOutOfRange { position, len });
        }
        Ok(())
    }

    fn validate_profile(profile: &PersonaProfile) -> Result<(), ConfigError> {
        if profile.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if profile.system_prompt.trim().is_empty() {
            return Err(ConfigError::EmptyPrompt);
        }
        Ok(())
    }
}
