//! Infrastructure layer for conclave
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: response providers, the JSONL conversation
//! logger, and configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig};
pub use logging::JsonlConversationLogger;
pub use providers::{
    CommandProvider, OfflineProvider, ProviderKind, ProviderSetupError, ResilientProvider,
    RetryPolicy, build_provider,
};
#[cfg(feature = "openai")]
pub use providers::OpenAiProvider;
