//! REPL (Read-Eval-Print Loop) for interactive chat

use super::controller::{ChatController, Handled};
use conclave_application::RunOutcome;
use conclave_domain::ContextId;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Context id of the local terminal
pub const TERMINAL_CONTEXT: &str = "terminal";

/// Interactive chat REPL over stdin
pub struct ChatRepl {
    controller: ChatController,
    context: ContextId,
}

impl ChatRepl {
    pub fn new(controller: ChatController) -> Self {
        Self {
            controller,
            context: ContextId::new(TERMINAL_CONTEXT),
        }
    }

    /// Run the interactive REPL on stdin
    pub async fn run(&self) -> std::io::Result<()> {
        self.run_with(BufReader::new(tokio::io::stdin())).await
    }

    /// Run the REPL over any line source.
    ///
    /// `/quit` stops a running discussion and exits; end of input waits for
    /// running discussions to finish first.
    pub async fn run_with<R: AsyncBufRead + Unpin>(&self, reader: R) -> std::io::Result<()> {
        let mut lines = reader.lines();
        let mut runs: Vec<JoinHandle<RunOutcome>> = Vec::new();

        self.controller.handle(&self.context, "/start").await;

        while let Some(line) = lines.next_line().await? {
            if matches!(line.trim(), "/quit" | "/exit" | "/q") {
                self.controller.registry().reset(&self.context);
                println!("Bye!");
                return Ok(());
            }

            if let Handled::RunStarted(run) = self.controller.handle(&self.context, &line).await {
                runs.retain(|r| !r.is_finished());
                runs.push(run);
            }
        }

        debug!("End of input, waiting for {} run(s)", runs.len());
        for run in runs {
            match run.await {
                Ok(outcome) => debug!(?outcome, "Run finished"),
                Err(e) => warn!("Run task failed: {}", e),
            }
        }
        Ok(())
    }
}
