//! Types for the RunCollaboration use case.

use crate::ports::response_provider::ProviderError;
use conclave_domain::{DiscussionConfig, DomainError, PersonaId};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Configuration shared between a session (which mutates it) and its engine
/// (which snapshots it at every iteration boundary)
pub type SharedConfig = Arc<RwLock<DiscussionConfig>>;

/// Wrap a configuration for sharing
pub fn shared_config(config: DiscussionConfig) -> SharedConfig {
    Arc::new(RwLock::new(config))
}

/// A provider failure that aborts the run
#[derive(Error, Debug, Clone)]
#[error("{persona_name} failed: {source}")]
pub struct CriticalRunError {
    pub persona: PersonaId,
    pub persona_name: String,
    #[source]
    pub source: ProviderError,
}

impl CriticalRunError {
    /// Text shown to the user; raw provider detail stays in the logs
    pub fn user_message(&self) -> String {
        format!(
            "Could not get a reply from {}. The text provider may be unavailable or slow.",
            self.persona_name
        )
    }
}

/// Why `start` refused to begin a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartRejection {
    AlreadyRunning,
    NoPersonasEnabled,
    InvalidTopic(DomainError),
}

/// How a call to `start` ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Preconditions failed; nothing changed
    Rejected(StartRejection),
    /// Loop finished; `final_report` is `None` when no summary was accepted
    Completed {
        accepted_summaries: Vec<String>,
        final_report: Option<String>,
    },
    /// Stopped at a checkpoint
    Interrupted { iterations_completed: u32 },
    /// A provider call failed
    Failed { persona: String, message: String },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

/// Reason the loop unwound early
#[derive(Debug)]
pub(super) enum Halt {
    Stopped,
    Critical(CriticalRunError),
}

impl From<CriticalRunError> for Halt {
    fn from(e: CriticalRunError) -> Self {
        Halt::Critical(e)
    }
}
