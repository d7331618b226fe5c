//! User-facing notices emitted during a collaboration
//!
//! The engine renders each [`Notice`] to plain text before handing it to the
//! notification sink; formatting beyond line breaks is the sink's concern.

/// Every message the collaboration core can show to a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    // ==================== Start / stop ====================
    AlreadyRunning,
    NoPersonasEnabled,
    Starting { topic: String },
    StopRequested,
    NothingToStop,
    Interrupted,

    // ==================== Round ====================
    Iteration { current: u32, total: u32 },
    Thinking { persona_name: String },
    Retrying { persona_name: String, attempt: u32, max_attempts: u32 },
    PersonaReply { persona_name: String, reply: String },
    Synthesizing,
    Summary { iteration: u32, summary: String },

    // ==================== Voting ====================
    VotingStarted,
    VoteCast { persona_name: String, reply: String },
    SummaryAccepted { votes_for: usize, votes_against: usize },
    SummaryRejected { votes_for: usize, votes_against: usize },

    // ==================== Finalization ====================
    FinishedWithoutSummaries,
    Finalizing,
    FinalReport { report: String },

    // ==================== Failure ====================
    CriticalError { message: String },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::AlreadyRunning => {
                write!(f, "A discussion is already running. Use /stop to interrupt it.")
            }
            Notice::NoPersonasEnabled => write!(f, "Error: enable at least one persona."),
            Notice::Starting { topic } => write!(
                f,
                "Starting collaboration on: \"{}\"\nUse /stop to interrupt.",
                topic
            ),
            Notice::StopRequested => write!(f, "Stop signal received..."),
            Notice::NothingToStop => write!(f, "There is no active discussion."),
            Notice::Interrupted => write!(f, "Discussion interrupted by user."),
            Notice::Iteration { current, total } => {
                write!(f, "--- Iteration {} of {} ---", current, total)
            }
            Notice::Thinking { persona_name } => write!(f, "{} is thinking...", persona_name),
            Notice::Retrying {
                persona_name,
                attempt,
                max_attempts,
            } => write!(
                f,
                "({}: the text provider did not answer, retrying {}/{}...)",
                persona_name, attempt, max_attempts
            ),
            Notice::PersonaReply {
                persona_name,
                reply,
            } => write!(f, "{}:\n{}", persona_name, reply),
            Notice::Synthesizing => write!(f, "The synthesizer is analysing the round..."),
            Notice::Summary { iteration, summary } => {
                write!(f, "Summary of iteration {}:\n{}", iteration, summary)
            }
            Notice::VotingStarted => write!(f, "Voting on the summary..."),
            Notice::VoteCast {
                persona_name,
                reply,
            } => write!(f, "{} votes:\n{}", persona_name, reply),
            Notice::SummaryAccepted {
                votes_for,
                votes_against,
            } => write!(
                f,
                "Vote passed ({} for, {} against). Summary accepted.",
                votes_for, votes_against
            ),
            Notice::SummaryRejected {
                votes_for,
                votes_against,
            } => write!(
                f,
                "Vote failed ({} for, {} against). Summary rejected.",
                votes_for, votes_against
            ),
            Notice::FinishedWithoutSummaries => {
                write!(f, "--- Discussion finished without accepted summaries. ---")
            }
            Notice::Finalizing => {
                write!(f, "--- All iterations complete. Writing the final report... ---")
            }
            Notice::FinalReport { report } => {
                write!(f, "Final collaboration report:\n\n{}", report)
            }
            Notice::CriticalError { message } => write!(f, "Critical error: {}", message),
        }
    }
}
