//! Personas: named roles that take part in a discussion
//!
//! Built-in personas live in [`catalog`]; users can add custom ones through
//! [`DiscussionConfig`](crate::discussion::DiscussionConfig). Every lookup
//! goes through [`resolve_persona`].

pub mod catalog;
pub mod entities;

pub use catalog::{BUILTIN_PERSONAS, BuiltinPersona};
pub use entities::{Persona, PersonaId, PersonaOrigin, PersonaProfile};

use crate::discussion::DiscussionConfig;

/// Resolve a persona id against a session's configuration.
///
/// Custom personas are consulted first, then built-ins. A built-in's system
/// prompt honours the session's override if one is set.
pub fn resolve_persona(id: &PersonaId, config: &DiscussionConfig) -> Option<Persona> {
    if let Some(profile) = config.custom_persona(id) {
        return Some(Persona {
            id: id.clone(),
            name: profile.name.clone(),
            system_prompt: profile.system_prompt.clone(),
            origin: PersonaOrigin::Custom,
        });
    }

    catalog::builtin(id.as_str()).map(|builtin| Persona {
        id: id.clone(),
        name: builtin.name.to_string(),
        system_prompt: config
            .prompt_override(id)
            .unwrap_or(builtin.system_prompt)
            .to_string(),
        origin: PersonaOrigin::BuiltIn,
    })
}

/// Every persona resolvable under `config`: built-ins in catalogue order,
/// then custom personas in id order.
pub fn all_personas(config: &DiscussionConfig) -> Vec<Persona> {
    BUILTIN_PERSONAS
        .iter()
        .map(|b| PersonaId::new(b.id))
        .chain(config.custom_personas().keys().cloned())
        .filter_map(|id| resolve_persona(&id, config))
        .collect()
}
