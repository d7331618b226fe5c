//! Run state of a collaboration
//!
//! ```text
//!           start(topic)            loop done
//!   Idle ───────────────▶ Running ─────────────▶ Finalizing ──▶ Idle
//!    ▲                       │
//!    └───────────────────────┘  stop observed at a checkpoint,
//!                               or critical provider error
//! ```

use crate::core::topic::Topic;
use serde::{Deserialize, Serialize};

/// Lifecycle phase of a collaboration engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnginePhase {
    #[default]
    Idle,
    Running,
    Finalizing,
}

impl EnginePhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, EnginePhase::Idle)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnginePhase::Idle => "idle",
            EnginePhase::Running => "running",
            EnginePhase::Finalizing => "finalizing",
        }
    }
}

impl std::fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of polling for cancellation at a checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    Continue,
    Stopped,
}

impl Checkpoint {
    pub fn is_stopped(&self) -> bool {
        matches!(self, Checkpoint::Stopped)
    }
}

/// Per-run data. Reset at the start of every run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    topic: Option<Topic>,
    iterations_completed: u32,
    accepted_summaries: Vec<String>,
}

impl RunState {
    /// Fresh state for a new run on `topic`
    pub fn begin(topic: Topic) -> Self {
        Self {
            topic: Some(topic),
            iterations_completed: 0,
            accepted_summaries: Vec::new(),
        }
    }

    pub fn topic(&self) -> Option<&Topic> {
        self.topic.as_ref()
    }

    pub fn iterations_completed(&self) -> u32 {
        self.iterations_completed
    }

    /// Accepted summaries in acceptance order
    pub fn accepted_summaries(&self) -> &[String] {
        &self.accepted_summaries
    }

    pub fn complete_iteration(&mut self) {
        self.iterations_completed += 1;
    }

    pub fn accept_summary(&mut self, summary: impl Into<String>) {
        self.accepted_summaries.push(summary.into());
    }
}
