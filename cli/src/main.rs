//! CLI entrypoint for conclave
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use conclave_application::{
    ConversationLogger, NoConversationLogger, NotificationSink, RunOutcome, SessionRegistry,
    StartRejection,
};
use conclave_domain::ContextId;
use conclave_infrastructure::{ConfigLoader, FileConfig, JsonlConversationLogger, build_provider};
use conclave_presentation::{ChatController, ChatRepl, Cli, ConsoleConfig, ConsoleSink};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Context id of a one-shot run
const CLI_CONTEXT: &str = "cli";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_tracing(&cli)?;

    info!("Starting conclave");

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_overrides(&mut config, &cli);

    let issues = config.validate();
    let mut errors = Vec::new();
    for issue in issues {
        if issue.is_error() {
            errors.push(issue.to_string());
        } else {
            warn!("{}", issue.message);
        }
    }
    if !errors.is_empty() {
        bail!("Invalid configuration:\n  {}", errors.join("\n  "));
    }

    // === Dependency Injection ===
    let provider = build_provider(&config.provider)?;

    let console: Arc<dyn NotificationSink> = Arc::new(ConsoleSink::stdout(ConsoleConfig {
        max_message_chars: config.chat.max_message_chars,
        chunk_delay: Duration::from_millis(config.chat.chunk_delay_ms),
        color: config.chat.color,
    }));
    let sinks = move |_: &ContextId| -> Arc<dyn NotificationSink> { Arc::clone(&console) };

    let (defaults, _) = config.to_discussion_config();
    let registry = SessionRegistry::new(provider, Arc::new(sinks))
        .with_defaults(defaults)
        .with_behavior(config.behavior.to_behavior_config())
        .with_conversation_logger(conversation_logger(&config));

    // Chat mode
    if cli.chat {
        let repl = ChatRepl::new(ChatController::new(Arc::new(registry)));
        repl.run().await?;
        return Ok(());
    }

    // Single topic mode - topic is required
    let Some(topic) = cli.topic else {
        bail!("A topic is required. Use --chat for interactive mode.");
    };

    let session = registry.get_or_create(&ContextId::new(CLI_CONTEXT));
    let engine = Arc::clone(session.engine());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            engine.request_stop().await;
        }
    });

    match session.engine().start(&topic).await {
        RunOutcome::Completed { .. } | RunOutcome::Interrupted { .. } => Ok(()),
        RunOutcome::Failed { persona, message } => {
            bail!("Discussion failed at {}: {}", persona, message)
        }
        RunOutcome::Rejected(StartRejection::InvalidTopic(e)) => bail!("{}", e),
        RunOutcome::Rejected(reason) => bail!("Discussion not started: {:?}", reason),
    }
}

/// Initialize logging based on verbosity level; `RUST_LOG` wins when set
fn init_tracing(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            builder.with_writer(writer).with_ansi(false).init();
            Ok(Some(guard))
        }
        None => {
            builder.with_writer(std::io::stderr).init();
            Ok(None)
        }
    }
}

/// Command-line flags take precedence over every configuration source
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if !cli.persona.is_empty() {
        config.discussion.personas = cli.persona.clone();
    }
    if let Some(iterations) = cli.iterations {
        config.discussion.iterations = iterations;
    }
    if let Some(language) = &cli.language {
        config.discussion.language = language.clone();
    }
    if let Some(kind) = &cli.provider {
        config.provider.kind = kind.clone();
    }
    if let Some(path) = &cli.conversation_log {
        config.logging.conversation_log = Some(path.display().to_string());
    }
}

fn conversation_logger(config: &FileConfig) -> Arc<dyn ConversationLogger> {
    let Some(path) = &config.logging.conversation_log else {
        return Arc::new(NoConversationLogger);
    };
    match JsonlConversationLogger::new(path) {
        Some(logger) => {
            info!("Conversation log: {}", logger.path().display());
            Arc::new(logger)
        }
        None => Arc::new(NoConversationLogger),
    }
}
