//! Domain layer for conclave
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Discussion
//!
//! A discussion runs a fixed number of iterations over a topic. In every
//! iteration the enabled personas speak in turn, the synthesizer condenses the
//! round, and the personas vote on that summary.
//!
//! ## Quorum
//!
//! Votes are classified by keyword prefix and tabulated with an
//! [`AcceptanceRule`]; accepted summaries become context for later rounds and
//! the input of the final report.

pub mod config;
pub mod core;
pub mod discussion;
pub mod persona;
pub mod prompt;
pub mod quorum;
pub mod session;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use core::{error::DomainError, topic::Topic};
pub use discussion::{
    Checkpoint, ConfigError, DiscussionConfig, EnginePhase, Notice, RoundTranscript, RunState,
    Turn,
};
pub use persona::{
    BUILTIN_PERSONAS, Persona, PersonaId, PersonaOrigin, PersonaProfile, all_personas,
    resolve_persona,
};
pub use prompt::PromptTemplate;
pub use quorum::{
    AcceptanceRule, Vote, VoteDecision, VoteKeywords, VoteResult, classify_vote, classify_with,
};
pub use session::{ContextId, PendingInput};
