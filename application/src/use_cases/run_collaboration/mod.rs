//! Run Collaboration use case
//!
//! Drives one discussion over a topic:
//!
//! ```text
//! start(topic)
//!   └─ for each iteration (checkpoint)
//!        ├─ persona turns, in enabled order (checkpoint before and after each)
//!        ├─ synthesizer summary (checkpoint before)
//!        └─ vote round (checkpoint before, and around each vote)
//!   └─ finalization (no checkpoints)
//! ```
//!
//! Cancellation is cooperative. [`CollaborationEngine::request_stop`] trips a
//! [`CancellationToken`] that the loop polls at the checkpoints above; a
//! provider call already in flight always runs to completion.

mod iteration;
mod types;
mod voting;

#[cfg(test)]
mod tests;

pub use types::{CriticalRunError, RunOutcome, SharedConfig, StartRejection, shared_config};

use crate::config::BehaviorConfig;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::notification::NotificationSink;
use crate::ports::response_provider::{ProviderError, ResponseProvider};
use conclave_domain::{
    Checkpoint, DiscussionConfig, EnginePhase, Notice, PersonaId, PromptTemplate, RunState, Topic,
    resolve_persona,
};
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use types::Halt;

struct EngineState {
    phase: EnginePhase,
    run: RunState,
    cancel: CancellationToken,
}

/// Returns the engine to `Idle` however `start` exits
struct IdleOnDrop<'a> {
    state: &'a Mutex<EngineState>,
}

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        lock(self.state).phase = EnginePhase::Idle;
    }
}

fn lock(state: &Mutex<EngineState>) -> MutexGuard<'_, EngineState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Iterative multi-persona collaboration engine, one per session
pub struct CollaborationEngine {
    provider: Arc<dyn ResponseProvider>,
    sink: Arc<dyn NotificationSink>,
    logger: Arc<dyn ConversationLogger>,
    config: SharedConfig,
    behavior: BehaviorConfig,
    state: Mutex<EngineState>,
}

impl CollaborationEngine {
    pub fn new(
        provider: Arc<dyn ResponseProvider>,
        sink: Arc<dyn NotificationSink>,
        config: SharedConfig,
    ) -> Self {
        Self {
            provider,
            sink,
            logger: Arc::new(crate::ports::conversation_logger::NoConversationLogger),
            config,
            behavior: BehaviorConfig::default(),
            state: Mutex::new(EngineState {
                phase: EnginePhase::Idle,
                run: RunState::default(),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Set the conversation logger for structured event logging.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_behavior(mut self, behavior: BehaviorConfig) -> Self {
        self.behavior = behavior;
        self
    }

    // ==================== Observers ====================

    pub fn phase(&self) -> EnginePhase {
        lock(&self.state).phase
    }

    pub fn is_running(&self) -> bool {
        !self.phase().is_idle()
    }

    /// Snapshot of the current (or most recent) run
    pub fn run_state(&self) -> RunState {
        lock(&self.state).run.clone()
    }

    // ==================== Operations ====================

    /// Run a full collaboration on `topic`.
    ///
    /// Precondition failures are reported to the sink and returned as
    /// [`RunOutcome::Rejected`] without touching any state.
    pub async fn start(&self, topic: &str) -> RunOutcome {
        let (token, topic) = match self.begin(topic) {
            Ok(started) => started,
            Err(rejection) => {
                self.reject(&rejection).await;
                return RunOutcome::Rejected(rejection);
            }
        };
        let _idle = IdleOnDrop { state: &self.state };

        info!(topic = %topic, "Starting collaboration");
        self.logger.log(ConversationEvent::new(
            "run_started",
            json!({ "topic": topic.content() }),
        ));
        self.notify(Notice::Starting {
            topic: topic.content().to_string(),
        })
        .await;

        // A stop that lands after the last vote still skips the final report
        let looped = match self.run_loop(&topic, &token).await {
            Ok(()) => Self::check(&token),
            Err(halt) => Err(halt),
        };

        match looped {
            Ok(()) => {
                lock(&self.state).phase = EnginePhase::Finalizing;
                match self.finalize(&topic).await {
                    Ok(final_report) => RunOutcome::Completed {
                        accepted_summaries: self.run_state().accepted_summaries().to_vec(),
                        final_report,
                    },
                    Err(e) => self.fail(e).await,
                }
            }
            Err(Halt::Stopped) => {
                let iterations_completed = self.run_state().iterations_completed();
                info!(iterations_completed, "Collaboration interrupted by user");
                self.logger.log(ConversationEvent::new(
                    "run_interrupted",
                    json!({ "iterations_completed": iterations_completed }),
                ));
                self.notify(Notice::Interrupted).await;
                RunOutcome::Interrupted {
                    iterations_completed,
                }
            }
            Err(Halt::Critical(e)) => self.fail(e).await,
        }
    }

    /// Ask the current run to stop at its next checkpoint.
    ///
    /// Returns whether a run was in progress. Never fails.
    pub async fn request_stop(&self) -> bool {
        if self.cancel() {
            self.notify(Notice::StopRequested).await;
            true
        } else {
            self.notify(Notice::NothingToStop).await;
            false
        }
    }

    /// Silent variant of [`request_stop`](Self::request_stop), used when the
    /// session is being discarded
    pub fn cancel(&self) -> bool {
        let state = lock(&self.state);
        if state.phase.is_idle() {
            return false;
        }
        state.cancel.cancel();
        true
    }

    // ==================== Internals ====================

    /// Check preconditions and move to `Running` in one critical section
    fn begin(&self, topic: &str) -> Result<(CancellationToken, Topic), StartRejection> {
        let mut state = lock(&self.state);
        if !state.phase.is_idle() {
            return Err(StartRejection::AlreadyRunning);
        }
        if self.config_snapshot().enabled_personas().is_empty() {
            return Err(StartRejection::NoPersonasEnabled);
        }
        let topic = Topic::try_new(topic).map_err(StartRejection::InvalidTopic)?;

        let token = CancellationToken::new();
        state.phase = EnginePhase::Running;
        state.run = RunState::begin(topic.clone());
        state.cancel = token.clone();
        Ok((token, topic))
    }

    async fn reject(&self, rejection: &StartRejection) {
        debug!(?rejection, "Start rejected");
        match rejection {
            StartRejection::AlreadyRunning => self.notify(Notice::AlreadyRunning).await,
            StartRejection::NoPersonasEnabled => self.notify(Notice::NoPersonasEnabled).await,
            StartRejection::InvalidTopic(e) => self.sink.notify(&e.to_string()).await,
        }
    }

    async fn fail(&self, e: CriticalRunError) -> RunOutcome {
        error!(persona = %e.persona, error = %e.source, "Collaboration aborted");
        self.logger.log(ConversationEvent::new(
            "run_failed",
            json!({
                "persona": e.persona.as_str(),
                "error": e.source.to_string(),
            }),
        ));
        let message = e.user_message();
        self.notify(Notice::CriticalError {
            message: message.clone(),
        })
        .await;
        RunOutcome::Failed {
            persona: e.persona_name,
            message,
        }
    }

    /// Produce the final report from the accepted summaries
    async fn finalize(&self, topic: &Topic) -> Result<Option<String>, CriticalRunError> {
        let accepted = self.run_state().accepted_summaries().to_vec();
        if accepted.is_empty() {
            info!("No summaries accepted, skipping final report");
            self.notify(Notice::FinishedWithoutSummaries).await;
            return Ok(None);
        }

        self.notify(Notice::Finalizing).await;
        let config = self.config_snapshot();
        let prompt = PromptTemplate::final_report(topic.content(), &accepted);
        let report = self
            .generate(&PersonaId::summarizer(), &prompt, &config)
            .await?;

        self.logger.log(ConversationEvent::new(
            "final_report",
            json!({ "report": report, "accepted_summaries": accepted.len() }),
        ));
        self.notify(Notice::FinalReport {
            report: report.clone(),
        })
        .await;
        Ok(Some(report))
    }

    fn checkpoint(token: &CancellationToken) -> Checkpoint {
        if token.is_cancelled() {
            Checkpoint::Stopped
        } else {
            Checkpoint::Continue
        }
    }

    /// Propagate a stop observed at a checkpoint
    fn check(token: &CancellationToken) -> Result<(), Halt> {
        match Self::checkpoint(token) {
            Checkpoint::Continue => Ok(()),
            Checkpoint::Stopped => Err(Halt::Stopped),
        }
    }

    fn config_snapshot(&self) -> DiscussionConfig {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn with_run<R>(&self, f: impl FnOnce(&mut RunState) -> R) -> R {
        f(&mut lock(&self.state).run)
    }

    fn persona_name(id: &PersonaId, config: &DiscussionConfig) -> String {
        resolve_persona(id, config)
            .map(|p| p.name)
            .unwrap_or_else(|| id.to_string())
    }

    /// One provider call. Failures become critical; blank replies too.
    async fn generate(
        &self,
        persona: &PersonaId,
        prompt: &str,
        config: &DiscussionConfig,
    ) -> Result<String, CriticalRunError> {
        debug!(persona = %persona, prompt_chars = prompt.chars().count(), "Requesting reply");

        let result = self
            .provider
            .generate(persona, prompt, config, Some(self.sink.as_ref()))
            .await
            .and_then(|reply| {
                if reply.trim().is_empty() {
                    Err(ProviderError::EmptyResponse)
                } else {
                    Ok(reply)
                }
            });

        result.map_err(|source| {
            warn!(persona = %persona, error = %source, "Provider call failed");
            CriticalRunError {
                persona: persona.clone(),
                persona_name: Self::persona_name(persona, config),
                source,
            }
        })
    }

    async fn notify(&self, notice: Notice) {
        self.sink.notice(&notice).await;
    }

    /// Pause after a turn or a vote
    async fn pace(&self) {
        if !self.behavior.turn_delay.is_zero() {
            tokio::time::sleep(self.behavior.turn_delay).await;
        }
    }
}
