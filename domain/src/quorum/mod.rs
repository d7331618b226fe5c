//! Summary voting domain
//!
//! After every round the enabled personas vote on the synthesizer's summary.
//!
//! ```text
//!   vote reply ──classify_vote──▶ VoteDecision ──┐
//!   vote reply ──classify_vote──▶ VoteDecision ──┼─▶ VoteResult (AcceptanceRule)
//!   vote reply ──classify_vote──▶ VoteDecision ──┘
//! ```
//!
//! Classification is a case-insensitive prefix match on the active language's
//! accept keyword ([`keywords::VoteKeywords`]); anything else is a reject.
//! The default rule is a strict majority: a tie rejects.

pub mod classify;
pub mod keywords;
pub mod rule;
pub mod vote;

pub use classify::{classify_vote, classify_with};
pub use keywords::{DEFAULT_LANGUAGE, VoteKeywords, supported_languages};
pub use rule::AcceptanceRule;
pub use vote::{Vote, VoteDecision, VoteResult};
