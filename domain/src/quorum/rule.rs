//! Acceptance rules for summary votes
//!
//! This module defines the rules used to decide whether a round's summary is
//! accepted. Every vote is either an accept or a reject; unparseable replies
//! have already been classified as rejects.

use serde::{Deserialize, Serialize};

/// Rule for deciding whether a summary vote passes
///
/// - `Majority`: strictly more accepts than rejects (default; a tie rejects)
/// - `Unanimous`: every vote must accept
/// - `AtLeast(n)`: at least n accepts, and still more accepts than rejects
///
/// # Example
///
/// ```
/// use conclave_domain::quorum::AcceptanceRule;
///
/// let rule = AcceptanceRule::Majority;
/// assert!(rule.is_satisfied(2, 1));
/// assert!(!rule.is_satisfied(1, 1)); // tie rejects
///
/// let strict = AcceptanceRule::Unanimous;
/// assert!(strict.is_satisfied(3, 0));
/// assert!(!strict.is_satisfied(2, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceRule {
    /// More accepts than rejects
    #[default]
    Majority,

    /// No rejects at all
    Unanimous,

    /// At least n accepts (and a majority)
    AtLeast(usize),
}

impl AcceptanceRule {
    /// Check whether the rule holds for the given tallies.
    ///
    /// Zero votes never pass.
    pub fn is_satisfied(&self, accepts: usize, rejects: usize) -> bool {
        if accepts + rejects == 0 {
            return false;
        }

        match self {
            AcceptanceRule::Majority => accepts > rejects,
            AcceptanceRule::Unanimous => rejects == 0,
            AcceptanceRule::AtLeast(n) => accepts >= *n && accepts > rejects,
        }
    }

    /// Get a human-readable description of this rule
    pub fn description(&self) -> String {
        match self {
            AcceptanceRule::Majority => "majority (more accepts than rejects)".to_string(),
            AcceptanceRule::Unanimous => "unanimous (no rejects)".to_string(),
            AcceptanceRule::AtLeast(n) => format!("at least {} accepts and a majority", n),
        }
    }
}

impl std::fmt::Display for AcceptanceRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for AcceptanceRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "majority" => Ok(AcceptanceRule::Majority),
            "unanimous" => Ok(AcceptanceRule::Unanimous),
            s if s.starts_with("atleast:") || s.starts_with("at_least:") => {
                let n: usize = s
                    .split(':')
                    .nth(1)
                    .ok_or("Missing number after atleast:")?
                    .parse()
                    .map_err(|_| "Invalid number for atleast")?;
                Ok(AcceptanceRule::AtLeast(n))
            }
            _ => Err(format!(
                "Unknown acceptance rule: {}. Valid: majority, unanimous, atleast:N",
                s
            )),
        }
    }
}
