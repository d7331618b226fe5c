//! Vote classification
//!
//! Turns a persona's free-text vote reply into an [`VoteDecision`]. The
//! policy is a prefix match on the active language's accept keyword; anything
//! else, including unparseable replies, counts as a rejection.

use super::keywords::VoteKeywords;
use super::vote::VoteDecision;

/// Classify a vote reply for the given discussion language.
///
/// Accept iff the trimmed text starts with the accept keyword, compared
/// case-insensitively. Unknown languages use the default keyword pair.
///
/// # Example
///
/// ```
/// use conclave_domain::quorum::{classify_vote, VoteDecision};
///
/// assert_eq!(classify_vote("  ACCEPT - solid summary", "English"), VoteDecision::Accept);
/// assert_eq!(classify_vote("Reject: misses the point", "English"), VoteDecision::Reject);
/// assert_eq!(classify_vote("Принимаю, всё верно", "Russian"), VoteDecision::Accept);
/// ```
pub fn classify_vote(text: &str, language: &str) -> VoteDecision {
    classify_with(text, VoteKeywords::for_language(language))
}

/// Classify against an explicit keyword pair
pub fn classify_with(text: &str, keywords: &VoteKeywords) -> VoteDecision {
    let reply = text.trim().to_lowercase();
    let accept = keywords.accept.to_lowercase();
    if reply.starts_with(&accept) {
        VoteDecision::Accept
    } else {
        VoteDecision::Reject
    }
}
