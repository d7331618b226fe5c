//! Application layer for conclave
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::BehaviorConfig;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    notification::{NoNotifications, NotificationSink, SinkFactory},
    response_provider::{ProviderError, ProviderRequest, ResponseProvider, ensure_non_empty},
};
pub use use_cases::manage_sessions::{Session, SessionRegistry};
pub use use_cases::run_collaboration::{
    CollaborationEngine, CriticalRunError, RunOutcome, SharedConfig, StartRejection,
    shared_config,
};
