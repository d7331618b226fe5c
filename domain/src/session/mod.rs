//! Session neighbours that are not part of the collaboration core
//!
//! - [`pending::ContextId`]: key of a session in the registry
//! - [`pending::PendingInput`]: the multi-step dialog a context is in

pub mod pending;

pub use pending::{ContextId, PendingInput};
