/// The four user operations: add, search, export, import
///
/// Each one returns a `Report` and never an error. Failures from any step
/// come back as a failed report carrying the user-facing message.

use crate::config::SearchMode;
use crate::core::executor::{ConfirmationSource, ExecutionGate, GateOutcome, ShellExecutor};
use crate::core::{BulkTransfer, Recorder, Searcher};
use crate::db::{AddRequest, Database, ExportRequest, ImportRequest, SearchRequest};
use crate::embeddings::EmbeddingProvider;
use crate::error::FastCmdError;
use std::path::PathBuf;
use std::sync::Arc;

/// Result of one user operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub success: bool,
    pub message: String,
    /// Extra lines: command output, skipped import elements
    pub details: Vec<String>,
}

impl Report {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

impl From<FastCmdError> for Report {
    fn from(err: FastCmdError) -> Self {
        Report::failed(err.user_message())
    }
}

pub struct FastCmd {
    recorder: Recorder,
    searcher: Searcher,
    transfer: BulkTransfer,
    shell: Arc<dyn ShellExecutor>,
    confirm: Arc<dyn ConfirmationSource>,
    search_mode: SearchMode,
    default_export: Box<dyn Fn() -> PathBuf + Send + Sync>,
}

impl FastCmd {
    /// Wire the operations to their collaborators
    ///
    /// `default_export` is asked for a path whenever export runs without one.
    pub fn new(
        db: Arc<Database>,
        embedder: Arc<dyn EmbeddingProvider>,
        shell: Arc<dyn ShellExecutor>,
        confirm: Arc<dyn ConfirmationSource>,
        search_mode: SearchMode,
        default_export: impl Fn() -> PathBuf + Send + Sync + 'static,
    ) -> Self {
        if embedder.dimension() != db.dimension() {
            log::warn!(
                "embedding provider returns {} dimensions but the store holds {}",
                embedder.dimension(),
                db.dimension()
            );
        }

        Self {
            recorder: Recorder::new(Arc::clone(&db), Arc::clone(&embedder)),
            searcher: Searcher::new(Arc::clone(&db), Arc::clone(&embedder)),
            transfer: BulkTransfer::new(db, embedder),
            shell,
            confirm,
            search_mode,
            default_export: Box::new(default_export),
        }
    }

    pub async fn add(&self, request: AddRequest) -> Report {
        match self.recorder.record(&request).await {
            Ok(_) => Report::ok(format!("✅ Command '{}' added.", request.description.trim())),
            Err(e) => Report::failed(format!("Error adding command: {}", e.user_message())),
        }
    }

    /// Find the closest stored command and offer to run it
    pub async fn search(&self, request: SearchRequest) -> Report {
        let matches = match self
            .searcher
            .search(&request.query_text, self.search_mode.top_k())
            .await
        {
            Ok(matches) => matches,
            Err(e) => return e.into(),
        };

        let gate = ExecutionGate::new(self.shell.as_ref(), self.confirm.as_ref());
        let outcome = match self.search_mode {
            SearchMode::Single => gate.run(matches.first()).await,
            SearchMode::Pick => gate.choose_and_run(&matches).await,
        };

        match outcome {
            Ok(GateOutcome::NoMatch) => Report::failed("No matching commands found."),
            Ok(GateOutcome::Cancelled) => Report::failed("Operation cancelled."),
            Ok(GateOutcome::Succeeded { stdout }) => {
                Report::ok("Command executed successfully.").with_details(output_lines(&stdout))
            }
            Ok(GateOutcome::Failed { exit_code, stderr }) => {
                FastCmdError::ExecutionFailed { exit_code, stderr }.into()
            }
            Err(e) => e.into(),
        }
    }

    pub async fn export(&self, request: ExportRequest) -> Report {
        let destination = request
            .destination
            .unwrap_or_else(|| (self.default_export)());

        match self.transfer.export(&destination).await {
            Ok(count) => Report::ok(format!(
                "Successfully exported {} commands to {}",
                count,
                destination.display()
            )),
            Err(e) => e.into(),
        }
    }

    /// Import never rolls back: a failed report may still mean some entries landed
    pub async fn import(&self, request: ImportRequest) -> Report {
        let summary = match self.transfer.import(&request.source).await {
            Ok(summary) => summary,
            Err(e) => return e.into(),
        };

        let skipped = summary
            .skipped
            .iter()
            .map(|reason| format!("⚠️ Skipped {}", reason))
            .collect();

        match summary.interrupted {
            Some(e) => Report::failed(format!(
                "Import stopped after {} commands: {}",
                summary.imported,
                e.user_message()
            ))
            .with_details(skipped),
            None => Report::ok(format!(
                "Imported {} commands ({} skipped)",
                summary.imported,
                summary.skipped.len()
            ))
            .with_details(skipped),
        }
    }
}

fn output_lines(stdout: &str) -> Vec<String> {
    stdout.lines().map(str::to_string).collect()
}
