//! Prompt templates for each step of a collaboration

use crate::discussion::RoundTranscript;
use crate::quorum::VoteKeywords;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Persona system prompt with the hard language instruction appended
    pub fn system_prompt(persona_prompt: &str, language: &str) -> String {
        format!(
            "{}\n\nIMPORTANT: You MUST reply exclusively in {}.",
            persona_prompt.trim_end(),
            language
        )
    }

    /// Single-string form used by providers without a separate system slot
    pub fn full_prompt(system_prompt: &str, prompt: &str) -> String {
        format!("{}\n\n{}", system_prompt, prompt)
    }

    /// Numbered block of previously accepted summaries, empty when none
    pub fn accepted_context(summaries: &[String]) -> String {
        if summaries.is_empty() {
            return String::new();
        }

        let listed = summaries
            .iter()
            .enumerate()
            .map(|(i, s)| format!("Summary {}: {}", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "Accepted summaries from previous rounds:\n{}\n\n",
            listed
        )
    }

    /// Prompt for one persona's turn in the current round
    pub fn persona_turn(
        topic: &str,
        accepted_summaries: &[String],
        transcript: &RoundTranscript,
        persona_name: &str,
    ) -> String {
        format!(
            r#"Main topic: "{}"

{}Discussion so far in the current round:
{}

---
As {}, give your view."#,
            topic,
            Self::accepted_context(accepted_summaries),
            transcript.render(),
            persona_name
        )
    }

    /// Prompt asking the synthesizer to condense a round
    pub fn summary_request(transcript: &RoundTranscript) -> String {
        format!(
            "Create a short summary of the discussion:\n\n{}",
            transcript.render()
        )
    }

    /// Prompt asking a persona to vote on a proposed summary
    pub fn vote_request(
        summary: &str,
        persona_name: &str,
        keywords: &VoteKeywords,
        language: &str,
    ) -> String {
        format!(
            r#"Here is the summary put to the vote:
"{}"

As {}, do you accept this summary? Answer ONLY with the word "{}" or "{}" in {}, then briefly explain your reason."#,
            summary, persona_name, keywords.accept, keywords.reject, language
        )
    }

    /// Prompt for the final report over all accepted summaries
    pub fn final_report(topic: &str, accepted_summaries: &[String]) -> String {
        format!(
            "Based on the topic \"{}\" and the summaries, write a final report.\n\nSummaries:\n{}",
            topic,
            accepted_summaries.join("\n\n")
        )
    }
}
