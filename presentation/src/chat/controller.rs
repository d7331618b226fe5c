//! Transport-agnostic chat controller
//!
//! Interprets every incoming line for a conversation context: slash commands
//! change settings or control the run, free text answers the pending dialog.
//! Replies go to the same sink the context's engine notifies, so a terminal
//! or a bot transport only has to feed lines in.

use super::command::{ChatCommand, ChatInput, help_text, welcome_text};
use conclave_application::{RunOutcome, Session, SessionRegistry};
use conclave_domain::{
    ConfigError, ContextId, DiscussionConfig, Notice, PendingInput, PersonaId, Topic,
    VoteKeywords, all_personas, resolve_persona,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// What handling a line led to
#[derive(Debug)]
pub enum Handled {
    /// Replies (if any) were delivered
    Replied,
    /// A collaboration run was spawned in the background
    RunStarted(JoinHandle<RunOutcome>),
}

pub struct ChatController {
    registry: Arc<SessionRegistry>,
}

impl ChatController {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Handle one line of input from `context`
    pub async fn handle(&self, context: &ContextId, line: &str) -> Handled {
        if line.trim().is_empty() {
            return Handled::Replied;
        }

        match ChatInput::parse(line) {
            Err(e) => {
                self.reply(context, &e.to_string()).await;
                Handled::Replied
            }
            Ok(ChatInput::Text(text)) => self.handle_text(context, &text).await,
            Ok(ChatInput::Command(command)) => self.handle_command(context, command).await,
        }
    }

    async fn handle_text(&self, context: &ContextId, text: &str) -> Handled {
        let session = self.registry.get_or_create(context);
        let Some(pending) = session.take_pending() else {
            self.reply(
                context,
                "Type /run to start a discussion or /help for the list of commands.",
            )
            .await;
            return Handled::Replied;
        };

        debug!(context = %context, ?pending, "Answering pending input");
        match pending {
            PendingInput::Topic => {
                let min_chars = self.registry.behavior().min_topic_chars;
                match Topic::parse(text, min_chars) {
                    Ok(topic) => return Self::spawn_run(&session, topic),
                    Err(e) => {
                        session.set_pending(PendingInput::Topic);
                        self.reply(context, &format!("{} Send another topic.", e))
                            .await;
                    }
                }
            }
            PendingInput::SystemPrompt { persona } => {
                let result = session.update_config(|c| {
                    c.set_system_prompt(&persona, text)
                        .map(|()| persona_name(c, &persona))
                });
                match result {
                    Ok(name) => {
                        self.reply(context, &format!("System prompt for \"{}\" updated.", name))
                            .await
                    }
                    Err(e) => self.rearm(context, &session, e, PendingInput::SystemPrompt { persona }).await,
                }
            }
            PendingInput::PersonaName => {
                let name = text.trim();
                if name.is_empty() {
                    self.rearm(context, &session, ConfigError::EmptyName, PendingInput::PersonaName)
                        .await;
                } else {
                    let next = PendingInput::PersonaPrompt {
                        name: name.to_string(),
                        editing: None,
                    };
                    self.reply(context, &next.prompt_text()).await;
                    session.set_pending(next);
                }
            }
            PendingInput::PersonaPrompt { name, editing } => {
                let result = match &editing {
                    None => session
                        .update_config(|c| c.add_custom_persona(name.as_str(), text))
                        .map(|id| format!("Persona \"{}\" created as {} and enabled.", name, id)),
                    Some(id) => session
                        .update_config(|c| c.edit_custom_persona(id, None, Some(text.to_string())))
                        .map(|()| format!("Persona \"{}\" updated.", name)),
                };
                match result {
                    Ok(message) => self.reply(context, &message).await,
                    Err(e) => {
                        self.rearm(context, &session, e, PendingInput::PersonaPrompt { name, editing })
                            .await
                    }
                }
            }
        }
        Handled::Replied
    }

    async fn handle_command(&self, context: &ContextId, command: ChatCommand) -> Handled {
        match command {
            ChatCommand::Start => self.reply(context, &welcome_text()).await,
            ChatCommand::Help => self.reply(context, help_text()).await,
            ChatCommand::Run => {
                let session = self.registry.get_or_create(context);
                session.set_pending(PendingInput::Topic);
                self.reply(context, &PendingInput::Topic.prompt_text()).await;
            }
            ChatCommand::Stop => match self.registry.get(context) {
                Some(session) => {
                    session.engine().request_stop().await;
                }
                None => {
                    self.reply(context, &Notice::NothingToStop.to_string())
                        .await
                }
            },
            ChatCommand::Reset => {
                if let Some(session) = self.registry.get(context)
                    && session.engine().is_running()
                {
                    session.engine().request_stop().await;
                }
                self.registry.reset(context);
                self.reply(context, "Discussion and settings have been reset.")
                    .await;
            }
            ChatCommand::Settings => {
                let session = self.registry.get_or_create(context);
                let text = render_settings(&session.config());
                self.reply(context, &text).await;
            }
            ChatCommand::Personas => {
                let session = self.registry.get_or_create(context);
                let text = render_personas(&session.config());
                self.reply(context, &text).await;
            }
            ChatCommand::Toggle(id) => {
                let result = self.update(context, |c| {
                    c.toggle_persona(&id).map(|enabled| {
                        let state = if enabled { "enabled" } else { "disabled" };
                        format!("{} {}.\n\n{}", persona_name(c, &id), state, render_order(c))
                    })
                });
                self.reply_result(context, result).await;
            }
            ChatCommand::Up(index) => {
                let result = self.update(context, |c| c.move_up(index).map(|()| render_order(c)));
                self.reply_result(context, result).await;
            }
            ChatCommand::Down(index) => {
                let result =
                    self.update(context, |c| c.move_down(index).map(|()| render_order(c)));
                self.reply_result(context, result).await;
            }
            ChatCommand::Dup(index) => {
                let result =
                    self.update(context, |c| c.duplicate_at(index).map(|()| render_order(c)));
                self.reply_result(context, result).await;
            }
            ChatCommand::Remove(index) => {
                let result = self.update(context, |c| c.remove_at(index).map(|_| render_order(c)));
                self.reply_result(context, result).await;
            }
            ChatCommand::Lang(language) => {
                let result = self.update(context, |c| {
                    c.set_language(&language).map(|()| {
                        let mut text = format!("Discussion language: {}", c.language());
                        if VoteKeywords::lookup(c.language()).is_none() {
                            let keywords = c.vote_keywords();
                            text.push_str(&format!(
                                "\nVotes will use \"{}\" / \"{}\".",
                                keywords.accept, keywords.reject
                            ));
                        }
                        text
                    })
                });
                self.reply_result(context, result).await;
            }
            ChatCommand::Iterations(count) => {
                let result = self.update(context, |c| {
                    c.set_iteration_count(count)
                        .map(|()| format!("Iterations: {}", c.iteration_count()))
                });
                self.reply_result(context, result).await;
            }
            ChatCommand::Prompt(id) => {
                let session = self.registry.get_or_create(context);
                let known = resolve_persona(&id, &session.config()).is_some();
                if known {
                    let pending = PendingInput::SystemPrompt { persona: id };
                    self.reply(context, &pending.prompt_text()).await;
                    session.set_pending(pending);
                } else {
                    self.reply(context, &ConfigError::UnknownPersona(id).to_string())
                        .await;
                }
            }
            ChatCommand::NewPersona => {
                let session = self.registry.get_or_create(context);
                session.set_pending(PendingInput::PersonaName);
                self.reply(context, &PendingInput::PersonaName.prompt_text())
                    .await;
            }
            ChatCommand::EditPersona(id) => {
                let session = self.registry.get_or_create(context);
                let name = session.config().custom_persona(&id).map(|p| p.name.clone());
                match name {
                    Some(name) => {
                        let pending = PendingInput::PersonaPrompt {
                            name,
                            editing: Some(id),
                        };
                        self.reply(context, &pending.prompt_text()).await;
                        session.set_pending(pending);
                    }
                    None => {
                        self.reply(context, &ConfigError::NotCustomPersona(id).to_string())
                            .await
                    }
                }
            }
            ChatCommand::DeletePersona(id) => {
                let result = self.update(context, |c| {
                    c.delete_custom_persona(&id)
                        .map(|profile| format!("Persona \"{}\" deleted.", profile.name))
                });
                self.reply_result(context, result).await;
            }
        }
        Handled::Replied
    }

    fn spawn_run(session: &Session, topic: Topic) -> Handled {
        let engine = Arc::clone(session.engine());
        let topic = topic.into_content();
        Handled::RunStarted(tokio::spawn(async move { engine.start(&topic).await }))
    }

    fn update<R>(
        &self,
        context: &ContextId,
        f: impl FnOnce(&mut DiscussionConfig) -> Result<R, ConfigError>,
    ) -> Result<R, ConfigError> {
        self.registry.get_or_create(context).update_config(f)
    }

    async fn rearm(
        &self,
        context: &ContextId,
        session: &Session,
        error: ConfigError,
        pending: PendingInput,
    ) {
        self.reply(context, &format!("{}\n{}", error, pending.prompt_text()))
            .await;
        session.set_pending(pending);
    }

    async fn reply_result(&self, context: &ContextId, result: Result<String, ConfigError>) {
        match result {
            Ok(text) => self.reply(context, &text).await,
            Err(e) => self.reply(context, &e.to_string()).await,
        }
    }

    async fn reply(&self, context: &ContextId, text: &str) {
        self.registry.sink_for(context).notify(text).await;
    }
}

fn persona_name(config: &DiscussionConfig, id: &PersonaId) -> String {
    resolve_persona(id, config)
        .map(|p| p.name)
        .unwrap_or_else(|| id.to_string())
}

/// Turn order with one-based positions
pub fn render_order(config: &DiscussionConfig) -> String {
    let personas = config.enabled_personas();
    if personas.is_empty() {
        return "Turn order: nobody is enabled. Use /toggle <id> to add a persona.".to_string();
    }

    let mut text = String::from("Turn order:");
    for (i, id) in personas.iter().enumerate() {
        text.push_str(&format!("\n  {}. {} ({})", i + 1, persona_name(config, id), id));
    }
    text
}

pub fn render_settings(config: &DiscussionConfig) -> String {
    let mut text = String::from("Current settings:\n\n");
    text.push_str(&render_order(config));
    text.push_str(&format!(
        "\n\nLanguage: {}\nIterations: {}\nAcceptance rule: {}",
        config.language(),
        config.iteration_count(),
        config.acceptance_rule()
    ));

    if config.custom_personas().is_empty() {
        text.push_str("\nCustom personas: none");
    } else {
        text.push_str("\nCustom personas:");
        for (id, profile) in config.custom_personas() {
            text.push_str(&format!("\n  {} ({})", profile.name, id));
        }
    }
    text
}

pub fn render_personas(config: &DiscussionConfig) -> String {
    let mut text = String::from("Personas ([x] = takes part):");
    for persona in all_personas(config) {
        if persona.id.is_summarizer() {
            continue;
        }
        let mark = if config.is_enabled(&persona.id) { "x" } else { " " };
        let origin = if persona.is_custom() { ", yours" } else { "" };
        text.push_str(&format!(
            "\n  [{}] {} ({}{})",
            mark, persona.name, persona.id, origin
        ));
    }
    text
}
