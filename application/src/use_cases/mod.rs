//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod manage_sessions;
pub mod run_collaboration;
