//! Discussion subdomain: configuration, run state, transcripts, notices

pub mod config;
pub mod notice;
pub mod run_state;
pub mod transcript;

pub use config::{ConfigError, DEFAULT_ITERATIONS, DiscussionConfig, MAX_ITERATIONS};
pub use notice::Notice;
pub use run_state::{Checkpoint, EnginePhase, RunState};
pub use transcript::{RoundTranscript, Turn};
