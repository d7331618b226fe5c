//! Presentation layer for conclave
//!
//! This crate contains the CLI definition, the chat controller and REPL,
//! and the console notification sink.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;

// Re-export commonly used types
pub use chat::{ChatController, ChatRepl, Handled};
pub use cli::commands::Cli;
pub use config::ConsoleConfig;
pub use output::console::ConsoleSink;
