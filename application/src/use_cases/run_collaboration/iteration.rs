//! Iteration loop: persona turns and synthesis.

use super::CollaborationEngine;
use super::types::Halt;
use crate::ports::conversation_logger::ConversationEvent;
use conclave_domain::{
    DiscussionConfig, Notice, PersonaId, PromptTemplate, RoundTranscript, Topic,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::info;

impl CollaborationEngine {
    /// Run iterations until the configured count is reached or a stop is seen.
    ///
    /// The configuration is re-read at every iteration boundary, so edits made
    /// mid-run apply from the next iteration on.
    pub(super) async fn run_loop(
        &self,
        topic: &Topic,
        token: &CancellationToken,
    ) -> Result<(), Halt> {
        let mut iteration: u32 = 0;

        loop {
            let config = self.config_snapshot();
            if iteration >= config.iteration_count() {
                return Ok(());
            }

            Self::check(token)?;
            iteration += 1;
            info!(
                iteration,
                total = config.iteration_count(),
                "Starting iteration"
            );
            self.notify(Notice::Iteration {
                current: iteration,
                total: config.iteration_count(),
            })
            .await;

            let accepted = self.run_state().accepted_summaries().to_vec();
            let transcript = self.run_round(topic, &accepted, &config, token).await?;

            Self::check(token)?;
            let summary = self.synthesize(iteration, &transcript, &config).await?;

            Self::check(token)?;
            let result = self.run_vote(&summary, &config, token).await?;

            self.logger.log(ConversationEvent::new(
                "vote_outcome",
                json!({
                    "iteration": iteration,
                    "accepted": result.accepted,
                    "votes_for": result.votes_for,
                    "votes_against": result.votes_against,
                }),
            ));

            if result.accepted {
                info!(
                    iteration,
                    votes_for = result.votes_for,
                    votes_against = result.votes_against,
                    "Summary accepted"
                );
                self.with_run(|run| run.accept_summary(summary));
                self.notify(Notice::SummaryAccepted {
                    votes_for: result.votes_for,
                    votes_against: result.votes_against,
                })
                .await;
            } else {
                info!(
                    iteration,
                    votes_for = result.votes_for,
                    votes_against = result.votes_against,
                    "Summary rejected"
                );
                self.notify(Notice::SummaryRejected {
                    votes_for: result.votes_for,
                    votes_against: result.votes_against,
                })
                .await;
            }

            self.with_run(|run| run.complete_iteration());
        }
    }

    /// Every enabled persona speaks once per occurrence, in order.
    async fn run_round(
        &self,
        topic: &Topic,
        accepted: &[String],
        config: &DiscussionConfig,
        token: &CancellationToken,
    ) -> Result<RoundTranscript, Halt> {
        let mut transcript = RoundTranscript::new();

        for persona in config.enabled_personas() {
            Self::check(token)?;

            let name = Self::persona_name(persona, config);
            let prompt = PromptTemplate::persona_turn(topic.content(), accepted, &transcript, &name);
            let reply = self.generate(persona, &prompt, config).await?;

            // The reply of a call that raced a stop is discarded unseen.
            Self::check(token)?;

            self.logger.log(ConversationEvent::new(
                "persona_turn",
                json!({
                    "persona": persona.as_str(),
                    "name": name,
                    "reply": reply,
                }),
            ));
            self.notify(Notice::PersonaReply {
                persona_name: name.clone(),
                reply: reply.clone(),
            })
            .await;
            transcript.push(persona.clone(), name, reply);

            self.pace().await;
        }

        Ok(transcript)
    }

    /// Ask the synthesizer for a summary of the round
    async fn synthesize(
        &self,
        iteration: u32,
        transcript: &RoundTranscript,
        config: &DiscussionConfig,
    ) -> Result<String, Halt> {
        self.notify(Notice::Synthesizing).await;

        let prompt = PromptTemplate::summary_request(transcript);
        let summary = self
            .generate(&PersonaId::summarizer(), &prompt, config)
            .await?;

        self.logger.log(ConversationEvent::new(
            "summary",
            json!({ "iteration": iteration, "summary": summary }),
        ));
        self.notify(Notice::Summary {
            iteration,
            summary: summary.clone(),
        })
        .await;

        Ok(summary)
    }
}
