//! Vote types for summary acceptance
//!
//! This module defines the voting primitives used when the personas decide
//! whether a round's summary enters the accumulated context.

use super::rule::AcceptanceRule;
use crate::persona::PersonaId;
use serde::{Deserialize, Serialize};

/// Outcome of classifying a single vote reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDecision {
    Accept,
    Reject,
}

impl VoteDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, VoteDecision::Accept)
    }
}

/// A single vote cast by a persona on a proposed summary
///
/// # Example
///
/// ```
/// use conclave_domain::quorum::{Vote, VoteDecision};
///
/// let vote = Vote::new("analyst", "Analytical Network", VoteDecision::Accept, "accept - concise");
/// assert!(vote.is_accept());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vote {
    /// Persona that voted
    pub persona: PersonaId,
    /// Display name at the time of the vote
    pub persona_name: String,
    /// Classified decision
    pub decision: VoteDecision,
    /// Raw reply text (keyword plus justification)
    pub reply: String,
}

impl Vote {
    pub fn new(
        persona: impl Into<PersonaId>,
        persona_name: impl Into<String>,
        decision: VoteDecision,
        reply: impl Into<String>,
    ) -> Self {
        Self {
            persona: persona.into(),
            persona_name: persona_name.into(),
            decision,
            reply: reply.into(),
        }
    }

    pub fn is_accept(&self) -> bool {
        self.decision.is_accept()
    }
}

/// Aggregated result of a voting round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResult {
    /// Whether the summary was accepted
    pub accepted: bool,
    /// Number of accept votes
    pub votes_for: usize,
    /// Number of reject votes (including unparseable replies)
    pub votes_against: usize,
    /// All individual votes, in casting order
    pub votes: Vec<Vote>,
}

impl VoteResult {
    /// Tally votes with the default strict-majority rule
    pub fn from_votes(votes: Vec<Vote>) -> Self {
        Self::from_votes_with_rule(votes, &AcceptanceRule::Majority)
    }

    /// Tally votes with a specific rule
    pub fn from_votes_with_rule(votes: Vec<Vote>, rule: &AcceptanceRule) -> Self {
        let votes_for = votes.iter().filter(|v| v.is_accept()).count();
        let votes_against = votes.len() - votes_for;

        Self {
            accepted: rule.is_satisfied(votes_for, votes_against),
            votes_for,
            votes_against,
            votes,
        }
    }

    pub fn total_votes(&self) -> usize {
        self.votes.len()
    }

    /// Check if the vote was unanimous either way
    pub fn is_unanimous(&self) -> bool {
        self.votes_for == self.total_votes() || self.votes_against == self.total_votes()
    }

    /// Generate a visual vote summary (e.g., "[●●○]")
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        for vote in &self.votes {
            summary.push(if vote.is_accept() { '●' } else { '○' });
        }
        summary.push(']');
        summary
    }
}
