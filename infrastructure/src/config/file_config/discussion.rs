//! Discussion configuration from TOML (`[discussion]`, `[prompts]` and
//! `[custom_personas.<id>]` sections)

use conclave_domain::{
    AcceptanceRule, ConfigError, ConfigIssue, ConfigIssueCode, DiscussionConfig, PersonaId,
    PersonaProfile, VoteKeywords,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw discussion configuration from TOML
///
/// # Example
///
/// ```toml
/// [discussion]
/// language = "German"
/// iterations = 3
/// personas = ["analyst", "ethicist", "custom-1"]
/// strict_language = false
/// acceptance_rule = "majority"        # "majority", "unanimous", "atleast:N"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiscussionConfig {
    /// Language every reply must be written in
    pub language: String,
    /// Number of rounds per run
    pub iterations: u32,
    /// Persona ids in turn order (repeats allowed)
    pub personas: Vec<String>,
    /// Refuse languages without a vote keyword table
    pub strict_language: bool,
    /// Rule deciding whether a summary is accepted
    pub acceptance_rule: String,
}

impl Default for FileDiscussionConfig {
    fn default() -> Self {
        let defaults = DiscussionConfig::default();
        Self {
            language: defaults.language().to_string(),
            iterations: defaults.iteration_count(),
            personas: defaults
                .enabled_personas()
                .iter()
                .map(|id| id.as_str().to_string())
                .collect(),
            strict_language: false,
            acceptance_rule: "majority".to_string(),
        }
    }
}

/// A user-defined persona
///
/// ```toml
/// [custom_personas.historian]
/// name = "Historian"
/// system_prompt = "You are a historian. Compare the idea with precedents."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCustomPersona {
    pub name: String,
    pub system_prompt: String,
}

impl FileDiscussionConfig {
    /// Parse acceptance_rule string, returning warnings on failure.
    pub fn parse_acceptance_rule(&self) -> (AcceptanceRule, Vec<ConfigIssue>) {
        match self.acceptance_rule.parse::<AcceptanceRule>() {
            Ok(rule) => (rule, vec![]),
            Err(_) => {
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "discussion.acceptance_rule".to_string(),
                        value: self.acceptance_rule.clone(),
                        valid_values: vec![
                            "majority".to_string(),
                            "unanimous".to_string(),
                            "atleast:N".to_string(),
                        ],
                    },
                    format!(
                        "discussion.acceptance_rule: unknown value '{}', falling back to 'majority'",
                        self.acceptance_rule
                    ),
                );
                (AcceptanceRule::default(), vec![issue])
            }
        }
    }

    /// Build the initial per-session configuration.
    ///
    /// Unknown persona ids are dropped with a warning so the enabled list only
    /// ever names resolvable personas.
    pub fn to_discussion_config(
        &self,
        prompts: &BTreeMap<String, String>,
        custom_personas: &BTreeMap<String, FileCustomPersona>,
    ) -> (DiscussionConfig, Vec<ConfigIssue>) {
        let (rule, mut issues) = self.parse_acceptance_rule();
        let mut config = DiscussionConfig::default()
            .with_strict_language(self.strict_language)
            .with_acceptance_rule(rule);

        // Custom personas first: the enabled list and prompt overrides may refer to them
        for (id, persona) in custom_personas {
            let profile = PersonaProfile::new(persona.name.trim(), persona.system_prompt.trim());
            match config
                .clone()
                .with_custom_persona(PersonaId::new(id.as_str()), profile)
            {
                Ok(updated) => config = updated,
                Err(e) => {
                    let code = match &e {
                        ConfigError::CustomIdOutOfRange(_) => ConfigIssueCode::OutOfRange {
                            field: "custom_personas".to_string(),
                            value: id.clone(),
                        },
                        _ => ConfigIssueCode::IncompleteCustomPersona { id: id.clone() },
                    };
                    issues.push(ConfigIssue::warning(
                        code,
                        format!("custom_personas.{}: {}, persona ignored", id, e),
                    ));
                }
            }
        }

        if let Err(e) = config.set_language(&self.language) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::UnsupportedLanguage {
                    language: self.language.clone(),
                },
                format!("discussion.language: {}", e),
            ));
        } else if VoteKeywords::lookup(&self.language).is_none() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::UnsupportedLanguage {
                    language: self.language.clone(),
                },
                format!(
                    "discussion.language: no vote keywords for '{}', votes use '{}'/'{}'",
                    self.language,
                    config.vote_keywords().accept,
                    config.vote_keywords().reject
                ),
            ));
        }

        if let Err(e) = config.set_iteration_count(self.iterations) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "discussion.iterations".to_string(),
                    value: self.iterations.to_string(),
                },
                format!("discussion.iterations: {}", e),
            ));
        }

        let mut enabled = Vec::with_capacity(self.personas.len());
        for raw in &self.personas {
            let id = PersonaId::new(raw.trim());
            if id.is_summarizer() {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::SummarizerEnabled,
                    "discussion.personas: the summarizer cannot take part in rounds, ignored",
                ));
            } else if !config.is_known(&id) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownPersona {
                        field: "discussion.personas".to_string(),
                        id: raw.clone(),
                    },
                    format!("discussion.personas: unknown persona '{}', ignored", raw),
                ));
            } else {
                enabled.push(id);
            }
        }
        if enabled.is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::NoPersonasEnabled,
                "discussion.personas: no persona enabled, runs will be refused until one is",
            ));
        }
        if let Err(e) = config.set_enabled_personas(enabled) {
            // Every id was checked above
            tracing::debug!("Unexpected persona list rejection: {}", e);
        }

        for (id, prompt) in prompts {
            if let Err(e) = config.set_system_prompt(&PersonaId::new(id.as_str()), prompt) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::UnknownPersona {
                        field: "prompts".to_string(),
                        id: id.clone(),
                    },
                    format!("prompts.{}: {}, ignored", id, e),
                ));
            }
        }

        (config, issues)
    }
}
