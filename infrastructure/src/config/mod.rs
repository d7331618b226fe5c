//! Configuration file loading for conclave
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CONCLAVE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./conclave.toml` or `./.conclave.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/conclave/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileBehaviorConfig, FileChatConfig, FileCommandConfig, FileConfig, FileCustomPersona,
    FileDiscussionConfig, FileLoggingConfig, FileOpenAiConfig, FileProviderConfig,
};
pub use loader::ConfigLoader;
