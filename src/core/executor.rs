/// Execution gate
///
/// A retrieved command only reaches a shell after the user answers the
/// confirmation prompt with the affirmative token. Everything else,
/// including no answer at all, cancels.

use crate::db::MatchResult;
use crate::error::Result;
use async_trait::async_trait;

/// The one answer that runs a command (case-insensitive)
pub const AFFIRMATIVE: &str = "y";

/// What a finished shell process left behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ShellOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs a command line through a shell
#[async_trait]
pub trait ShellExecutor: Send + Sync {
    async fn run(&self, command: &str) -> Result<ShellOutput>;
}

/// Asks the user something and returns what they typed
///
/// `None` means the input ended (EOF, closed terminal).
pub trait ConfirmationSource: Send + Sync {
    fn prompt(&self, message: &str) -> Option<String>;
}

/// The platform shell: `sh -c` on Unix, `cmd /C` on Windows
///
/// Inherits the caller's environment and working directory. No sandboxing.
pub struct SystemShell;

#[async_trait]
impl ShellExecutor for SystemShell {
    async fn run(&self, command: &str) -> Result<ShellOutput> {
        let mut cmd = if cfg!(windows) {
            let mut c = tokio::process::Command::new("cmd");
            c.arg("/C");
            c
        } else {
            let mut c = tokio::process::Command::new("sh");
            c.arg("-c");
            c
        };

        let output = cmd.arg(command).output().await?;

        Ok(ShellOutput {
            // Killed by a signal: no code
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Where one pass through the gate ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Nothing to present
    NoMatch,
    /// Anything but the affirmative token; nothing ran
    Cancelled,
    /// Exit code 0
    Succeeded { stdout: String },
    /// Non-zero exit code
    Failed { exit_code: i32, stderr: String },
}

/// Only an exact, case-insensitive `y` counts. Surrounding whitespace is ignored.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case(AFFIRMATIVE)
}

/// How a match is shown to the user before asking
pub fn present_match(m: &MatchResult) -> String {
    format!(
        "\n🎯 [{}% match]\n\n🔹 Command: {}\n📝 Description : {}\n",
        m.confidence_percent(),
        m.command,
        m.description
    )
}

pub struct ExecutionGate<'a> {
    shell: &'a dyn ShellExecutor,
    confirm: &'a dyn ConfirmationSource,
}

impl<'a> ExecutionGate<'a> {
    pub fn new(shell: &'a dyn ShellExecutor, confirm: &'a dyn ConfirmationSource) -> Self {
        Self { shell, confirm }
    }

    /// Present `candidate`, ask, and run it on a yes
    ///
    /// # Returns
    /// * `Ok(GateOutcome)` - Terminal state of the gate
    /// * `Err(FastCmdError::Io)` - The shell itself could not be started
    pub async fn run(&self, candidate: Option<&MatchResult>) -> Result<GateOutcome> {
        let candidate = match candidate {
            Some(m) => m,
            None => return Ok(GateOutcome::NoMatch),
        };

        let question = format!(
            "{}\nExecute this command? ({}/other): ",
            present_match(candidate),
            AFFIRMATIVE
        );
        let answer = self.confirm.prompt(&question);

        if !answer.as_deref().is_some_and(is_affirmative) {
            log::warn!("execution of entry {} declined", candidate.id);
            return Ok(GateOutcome::Cancelled);
        }

        self.execute(&candidate.command).await
    }

    /// Offer several matches by number, then gate the chosen one
    ///
    /// An answer that isn't one of the listed numbers cancels.
    pub async fn choose_and_run(&self, candidates: &[MatchResult]) -> Result<GateOutcome> {
        if candidates.len() <= 1 {
            return self.run(candidates.first()).await;
        }

        let mut menu = String::new();
        for (i, m) in candidates.iter().enumerate() {
            menu.push_str(&format!(
                "{:3}. [{}%] {}  ({})\n",
                i + 1,
                m.confidence_percent(),
                m.command,
                m.description
            ));
        }
        menu.push_str(&format!("Pick a command (1-{}, anything else cancels): ", candidates.len()));

        let picked = self
            .confirm
            .prompt(&menu)
            .and_then(|a| a.trim().parse::<usize>().ok())
            .filter(|n| (1..=candidates.len()).contains(n));

        match picked {
            Some(n) => self.run(Some(&candidates[n - 1])).await,
            None => Ok(GateOutcome::Cancelled),
        }
    }

    async fn execute(&self, command: &str) -> Result<GateOutcome> {
        log::debug!("executing: {}", command);
        let output = self.shell.run(command).await?;

        if output.success() {
            Ok(GateOutcome::Succeeded {
                stdout: output.stdout,
            })
        } else {
            Ok(GateOutcome::Failed {
                exit_code: output.exit_code,
                stderr: output.stderr,
            })
        }
    }
}
