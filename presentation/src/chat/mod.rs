//! Interactive chat module
//!
//! [`ChatController`] holds the transport-agnostic chat logic;
//! [`ChatRepl`] feeds it lines from the terminal.

mod command;
mod controller;
mod repl;

pub use command::{ChatCommand, ChatInput, CommandError, help_text, welcome_text};
pub use controller::{ChatController, Handled, render_order, render_personas, render_settings};
pub use repl::ChatRepl;
