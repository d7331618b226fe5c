//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for conclave
#[derive(Parser, Debug)]
#[command(name = "conclave")]
#[command(author, version, about = "Personas debate a topic in rounds and vote on summaries")]
#[command(long_about = r#"
Conclave runs an iterative discussion between personas.

Every iteration has three steps:
1. Turns: each enabled persona speaks in order, seeing the round so far
2. Synthesis: the synthesizer summarises the round
3. Vote: the personas accept or reject the summary

Accepted summaries become context for later iterations and feed the final
report.

Configuration files are loaded from (in priority order):
1. CONCLAVE_* environment variables (CONCLAVE_DISCUSSION__ITERATIONS=3)
2. --config <path>     Explicit config file
3. ./conclave.toml     Project-level config
4. ~/.config/conclave/config.toml   Global config

Example:
  conclave "Should cities ban private cars?"
  conclave -p analyst -p ethicist -p devils_advocate --iterations 3 "Universal basic income"
  conclave --chat
"#)]
pub struct Cli {
    /// The topic to discuss (not required in chat mode)
    pub topic: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Personas taking part, in turn order (can be specified multiple times)
    #[arg(short, long, value_name = "ID")]
    pub persona: Vec<String>,

    /// Number of iterations
    #[arg(short, long, value_name = "N")]
    pub iterations: Option<u32>,

    /// Discussion language
    #[arg(short, long, value_name = "LANGUAGE")]
    pub language: Option<String>,

    /// Reply provider: offline, command, openai
    #[arg(long, value_name = "KIND")]
    pub provider: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Append the discussion as JSON lines to this file
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
