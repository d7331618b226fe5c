//! Configuration value objects shared across layers
//!
//! Loaded configuration is checked as a whole and reports structured issues
//! with severity levels instead of failing on the first problem.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A string field holds a value outside its allowed set.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// A persona id is neither built-in nor custom.
    UnknownPersona { field: String, id: String },
    /// The synthesizer was listed as a round participant.
    SummarizerEnabled,
    /// No persona would take part in a round.
    NoPersonasEnabled,
    /// A numeric field is outside its allowed range.
    OutOfRange { field: String, value: String },
    /// Language has no vote keyword table; the default pair will be used.
    UnsupportedLanguage { language: String },
    /// A custom persona is missing its name or prompt.
    IncompleteCustomPersona { id: String },
    /// The selected provider lacks a required setting.
    MissingProviderSetting { field: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}
