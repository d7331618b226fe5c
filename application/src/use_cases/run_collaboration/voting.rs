//! Voting round on a proposed summary.

use super::CollaborationEngine;
use super::types::Halt;
use crate::ports::conversation_logger::ConversationEvent;
use conclave_domain::{DiscussionConfig, Notice, PromptTemplate, Vote, VoteResult, classify_with};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::debug;

impl CollaborationEngine {
    /// Collect one vote per enabled persona occurrence and tally them.
    ///
    /// Votes are requested sequentially. A reply that does not start with the
    /// accept keyword counts as a reject.
    pub(super) async fn run_vote(
        &self,
        summary: &str,
        config: &DiscussionConfig,
        token: &CancellationToken,
    ) -> Result<VoteResult, Halt> {
        self.notify(Notice::VotingStarted).await;

        let keywords = config.vote_keywords();
        let mut votes = Vec::with_capacity(config.enabled_personas().len());

        for persona in config.enabled_personas() {
            Self::check(token)?;

            let name = Self::persona_name(persona, config);
            let prompt = PromptTemplate::vote_request(summary, &name, keywords, config.language());
            let reply = self.generate(persona, &prompt, config).await?;

            self.notify(Notice::VoteCast {
                persona_name: name.clone(),
                reply: reply.clone(),
            })
            .await;

            let decision = classify_with(&reply, keywords);
            debug!(persona = %persona, ?decision, "Vote classified");
            self.logger.log(ConversationEvent::new(
                "vote",
                json!({
                    "persona": persona.as_str(),
                    "decision": decision,
                    "reply": reply,
                }),
            ));
            votes.push(Vote::new(persona.clone(), name, decision, reply));

            Self::check(token)?;
            self.pace().await;
        }

        Ok(VoteResult::from_votes_with_rule(
            votes,
            &config.acceptance_rule(),
        ))
    }
}
