//! Built-in persona catalogue

/// A persona that ships with the system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinPersona {
    pub id: &'static str,
    pub name: &'static str,
    pub system_prompt: &'static str,
}

/// All built-in personas, in menu order. The synthesizer comes last.
pub const BUILTIN_PERSONAS: &[BuiltinPersona] = &[
    BuiltinPersona {
        id: "analyst",
        name: "Analytical Network",
        system_prompt: "You are the Analytical Network. Focus on logic, data and structured reasoning.",
    },
    BuiltinPersona {
        id: "creative",
        name: "Creative Network",
        system_prompt: "You are the Creative Network. Focus on new ideas, alternatives and innovative perspectives.",
    },
    BuiltinPersona {
        id: "implementer",
        name: "Implementation Network",
        system_prompt: "You are the Implementation Network. Focus on practical application and technical feasibility.",
    },
    BuiltinPersona {
        id: "data",
        name: "Data Science Network",
        system_prompt: "You are the Data Science Network. Focus on statistics, patterns and empirical evidence.",
    },
    BuiltinPersona {
        id: "ethicist",
        name: "Ethics Network",
        system_prompt: "You are the Ethics Network. Focus on moral consequences and social impact.",
    },
    BuiltinPersona {
        id: "ux",
        name: "UX Network",
        system_prompt: "You are the UX Network. Focus on user experience and usability.",
    },
    BuiltinPersona {
        id: "systems",
        name: "Systems Thinking Network",
        system_prompt: "You are the Systems Thinking Network. Focus on the holistic picture and interconnections.",
    },
    BuiltinPersona {
        id: "devils_advocate",
        name: "Devil's Advocate Network",
        system_prompt: "You are the Devil's Advocate Network. Your role is to challenge assumptions and stress-test ideas.",
    },
    BuiltinPersona {
        id: "summarizer",
        name: "Synthesizer Network",
        system_prompt: "You are the Synthesizer Network. Your role is to read the discussion and write a short, neutral summary of its key points.",
    },
];

/// Ids enabled in a fresh configuration
pub const DEFAULT_ENABLED: &[&str] = &["analyst", "creative"];

/// Look up a built-in persona by id
pub fn builtin(id: &str) -> Option<&'static BuiltinPersona> {
    BUILTIN_PERSONAS.iter().find(|p| p.id == id)
}

/// Built-ins that may take part in a round (everything but the synthesizer)
pub fn discussion_builtins() -> impl Iterator<Item = &'static BuiltinPersona> {
    BUILTIN_PERSONAS
        .iter()
        .filter(|p| p.id != super::PersonaId::SUMMARIZER)
}
