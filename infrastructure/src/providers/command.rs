//! Provider backed by an external text-generation program.
//!
//! One child process per call: the combined system and user prompt is written
//! to stdin, the reply is read from stdout. The child is killed when the call
//! future is dropped (timeout) and, on Linux, when this process dies.

use super::ProviderSetupError;
use crate::config::FileCommandConfig;
use async_trait::async_trait;
use conclave_application::{
    NotificationSink, ProviderError, ProviderRequest, ResponseProvider, ensure_non_empty,
};
use conclave_domain::core::string::truncate;
use conclave_domain::{DiscussionConfig, PersonaId};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Longest stderr excerpt carried in an error
const STDERR_EXCERPT_CHARS: usize = 300;

#[derive(Debug, Clone)]
pub struct CommandProvider {
    program: String,
    args: Vec<String>,
}

impl CommandProvider {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &FileCommandConfig) -> Result<Self, ProviderSetupError> {
        let program = config
            .program
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(ProviderSetupError::MissingProgram)?;
        Ok(Self::new(program, config.args.clone()))
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Linux: request kernel to send SIGTERM to child when parent dies.
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        cmd
    }

    async fn run(&self, input: &str) -> Result<String, ProviderError> {
        let mut child = self.command().spawn().map_err(|e| {
            ProviderError::Unavailable(format!("failed to spawn '{}': {}", self.program, e))
        })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            ProviderError::Unavailable(format!("'{}' stdin unavailable", self.program))
        })?;

        let write = async move {
            if let Err(e) = stdin.write_all(input.as_bytes()).await {
                // Programs may exit without reading their input
                debug!("Failed to write prompt to provider stdin: {}", e);
            }
            drop(stdin);
        };
        let ((), output) = tokio::join!(write, child.wait_with_output());

        let output = output.map_err(|e| {
            ProviderError::Unavailable(format!("'{}' did not complete: {}", self.program, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                "Provider program '{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            );
            return Err(ProviderError::Unavailable(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                truncate(stderr.trim(), STDERR_EXCERPT_CHARS)
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl ResponseProvider for CommandProvider {
    async fn generate(
        &self,
        persona: &PersonaId,
        prompt: &str,
        config: &DiscussionConfig,
        _progress: Option<&dyn NotificationSink>,
    ) -> Result<String, ProviderError> {
        let request = ProviderRequest::resolve(persona, prompt, config)?;
        debug!(
            "Running '{}' for {} ({} prompt bytes)",
            self.program,
            persona,
            request.prompt.len()
        );
        let raw = self.run(&request.combined()).await?;
        ensure_non_empty(&raw)
    }
}
