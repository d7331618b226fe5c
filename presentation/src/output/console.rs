//! Console notification sink
//!
//! Writes every notification to the terminal, splitting long text into
//! chunks on character boundaries and pacing the chunks.

use crate::config::ConsoleConfig;
use async_trait::async_trait;
use colored::Colorize;
use conclave_application::NotificationSink;
use conclave_domain::core::string::split_chunks;
use std::io::Write;
use std::sync::Mutex;

/// [`NotificationSink`] writing to stdout (or any writer)
pub struct ConsoleSink {
    config: ConsoleConfig,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    pub fn stdout(config: ConsoleConfig) -> Self {
        Self::with_writer(config, Box::new(std::io::stdout()))
    }

    pub fn with_writer(config: ConsoleConfig, writer: Box<dyn Write + Send>) -> Self {
        Self {
            config,
            writer: Mutex::new(writer),
        }
    }

    fn write_chunk(&self, chunk: &str) {
        let text = if self.config.color {
            Self::style(chunk)
        } else {
            chunk.to_string()
        };

        let mut writer = self.writer.lock().unwrap_or_else(|p| p.into_inner());
        if let Err(e) = writeln!(writer, "{}\n", text).and_then(|_| writer.flush()) {
            tracing::warn!("Failed to write to console: {}", e);
        }
    }

    /// Highlight notices by their leading text
    fn style(text: &str) -> String {
        if text.starts_with("---") {
            text.cyan().bold().to_string()
        } else if text.starts_with("Critical error") || text.starts_with("Error:") {
            text.red().bold().to_string()
        } else if text.starts_with("Vote passed") {
            text.green().to_string()
        } else if text.starts_with("Vote failed") || text.starts_with("Stop signal") {
            text.yellow().to_string()
        } else if text.ends_with("is thinking...") || text.contains(", retrying ") {
            text.dimmed().to_string()
        } else if text.starts_with("Final collaboration report:") {
            match text.split_once('\n') {
                Some((head, rest)) => format!("{}\n{}", head.bold().magenta(), rest),
                None => text.bold().magenta().to_string(),
            }
        } else {
            text.to_string()
        }
    }
}

#[async_trait]
impl NotificationSink for ConsoleSink {
    async fn notify(&self, text: &str) {
        let chunks = split_chunks(text, self.config.max_message_chars);
        let last = chunks.len().saturating_sub(1);

        for (i, chunk) in chunks.iter().enumerate() {
            self.write_chunk(chunk);
            if i < last && !self.config.chunk_delay.is_zero() {
                tokio::time::sleep(self.config.chunk_delay).await;
            }
        }
    }
}
