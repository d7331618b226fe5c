//! Core domain concepts shared across all subdomains.
//!
//! - [`topic::Topic`] - a validated discussion subject
//! - [`error::DomainError`] - domain-level errors
//! - [`string`] - character-aware truncation and chunking

pub mod error;
pub mod string;
pub mod topic;
