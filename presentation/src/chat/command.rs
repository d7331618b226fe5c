//! Slash command parsing for the chat surface

use conclave_domain::PersonaId;
use thiserror::Error;

/// A parsed chat command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Start,
    Help,
    Run,
    Stop,
    Reset,
    Settings,
    Personas,
    Toggle(PersonaId),
    /// Positions are zero-based here; users type them one-based
    Up(usize),
    Down(usize),
    Dup(usize),
    Remove(usize),
    Lang(String),
    Iterations(u32),
    Prompt(PersonaId),
    NewPersona,
    EditPersona(PersonaId),
    DeletePersona(PersonaId),
}

/// A line of chat input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Command(ChatCommand),
    Text(String),
}

/// Why a slash command could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}. Type /help for the list of commands.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a position. Positions start at 1 (see /settings).")]
    BadPosition(String),

    #[error("'{0}' is not a number.")]
    BadNumber(String),
}

impl ChatInput {
    /// Parse one line. Lines starting with `/` are commands; everything else
    /// is free text.
    ///
    /// A `@botname` suffix on the command word is ignored (`/run@conclave`).
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let Some(body) = line.strip_prefix('/') else {
            return Ok(ChatInput::Text(line.to_string()));
        };

        let (word, args) = match body.split_once(char::is_whitespace) {
            Some((word, args)) => (word, args.trim()),
            None => (body, ""),
        };
        let word = word.split('@').next().unwrap_or(word).to_lowercase();

        let command = match word.as_str() {
            "start" => ChatCommand::Start,
            "help" | "h" | "?" => ChatCommand::Help,
            "run" => ChatCommand::Run,
            "stop" => ChatCommand::Stop,
            "reset" => ChatCommand::Reset,
            "settings" => ChatCommand::Settings,
            "personas" => ChatCommand::Personas,
            "toggle" => ChatCommand::Toggle(persona_arg(args, "/toggle <persona-id>")?),
            "up" => ChatCommand::Up(position_arg(args, "/up <position>")?),
            "down" => ChatCommand::Down(position_arg(args, "/down <position>")?),
            "dup" => ChatCommand::Dup(position_arg(args, "/dup <position>")?),
            "remove" => ChatCommand::Remove(position_arg(args, "/remove <position>")?),
            "lang" => {
                if args.is_empty() {
                    return Err(CommandError::Usage("/lang <Language>"));
                }
                ChatCommand::Lang(args.to_string())
            }
            "iterations" => {
                if args.is_empty() {
                    return Err(CommandError::Usage("/iterations <n>"));
                }
                let n = args
                    .parse()
                    .map_err(|_| CommandError::BadNumber(args.to_string()))?;
                ChatCommand::Iterations(n)
            }
            "prompt" => ChatCommand::Prompt(persona_arg(args, "/prompt <persona-id>")?),
            "newpersona" => ChatCommand::NewPersona,
            "editpersona" => {
                ChatCommand::EditPersona(persona_arg(args, "/editpersona <persona-id>")?)
            }
            "deletepersona" => {
                ChatCommand::DeletePersona(persona_arg(args, "/deletepersona <persona-id>")?)
            }
            _ => return Err(CommandError::Unknown(format!("/{}", word))),
        };

        Ok(ChatInput::Command(command))
    }
}

fn persona_arg(args: &str, usage: &'static str) -> Result<PersonaId, CommandError> {
    match args.split_whitespace().next() {
        Some(id) => Ok(PersonaId::new(id)),
        None => Err(CommandError::Usage(usage)),
    }
}

fn position_arg(args: &str, usage: &'static str) -> Result<usize, CommandError> {
    let Some(raw) = args.split_whitespace().next() else {
        return Err(CommandError::Usage(usage));
    };
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(CommandError::BadPosition(raw.to_string())),
    }
}

/// Help text listing every command
pub fn help_text() -> &'static str {
    "Commands:
  /start              - Show the welcome message
  /help               - Show this help
  /run                - Start a new discussion (you will be asked for the topic)
  /stop               - Stop the running discussion
  /reset              - Forget this chat's settings and dialog
  /settings           - Show the current settings
  /personas           - List every persona and whether it takes part
  /toggle <id>        - Enable or disable a persona
  /up <n>, /down <n>  - Move the persona at position n
  /dup <n>            - Give the persona at position n another turn
  /remove <n>         - Remove the turn at position n
  /lang <Language>    - Set the discussion language
  /iterations <n>     - Set the number of iterations
  /prompt <id>        - Replace a persona's system prompt
  /newpersona         - Create your own persona
  /editpersona <id>   - Change the prompt of one of your personas
  /deletepersona <id> - Delete one of your personas"
}

/// Welcome text for `/start`
pub fn welcome_text() -> String {
    format!(
        "Welcome to Conclave!

Several personas discuss your topic in rounds. After every round a
synthesizer summarises it and the personas vote on the summary; accepted
summaries feed the next round and the final report.

How to begin:
  1. Type /run.
  2. Send the topic you want discussed.
  3. Adjust participants and language with the commands below if needed.

{}",
        help_text()
    )
}
