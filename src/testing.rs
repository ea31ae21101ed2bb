// Test doubles for the embedding provider, the shell and the confirmation prompt.

use crate::core::executor::{ConfirmationSource, ShellExecutor, ShellOutput};
use crate::embeddings::EmbeddingProvider;
use crate::error::{FastCmdError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const TEST_DIMENSION: usize = 8;

/// Deterministic bag-of-words embedder
///
/// Each lowercase word bumps one bucket, so texts sharing words point the
/// same way. Fixed vectors can be pinned per text.
pub struct FakeEmbeddings {
    pinned: HashMap<String, Vec<f32>>,
    calls: AtomicUsize,
    fail_after: Option<usize>,
}

impl FakeEmbeddings {
    pub fn new() -> Self {
        Self {
            pinned: HashMap::new(),
            calls: AtomicUsize::new(0),
            fail_after: None,
        }
    }

    pub fn pin(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.pinned.insert(text.to_string(), vector);
        self
    }

    /// Succeed `n` times, then report the provider as down
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbeddings {
    fn dimension(&self) -> usize {
        TEST_DIMENSION
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(FastCmdError::InvalidInput("description cannot be empty".to_string()));
        }

        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|n| call >= n) {
            return Err(FastCmdError::EmbeddingUnavailable("connection refused".to_string()));
        }

        if let Some(v) = self.pinned.get(text) {
            return Ok(v.clone());
        }

        let mut v = vec![0.0f32; TEST_DIMENSION];
        for word in text.to_lowercase().split_whitespace() {
            let bucket = word.bytes().map(usize::from).sum::<usize>() % TEST_DIMENSION;
            v[bucket] += 1.0;
        }
        Ok(v)
    }
}

/// Hands out canned answers, `None` once they run out
pub struct ScriptedConfirmation {
    answers: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirmation {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl ConfirmationSource for ScriptedConfirmation {
    fn prompt(&self, message: &str) -> Option<String> {
        self.prompts.lock().unwrap().push(message.to_string());
        self.answers.lock().unwrap().pop_front()
    }
}

/// Records every command it is asked to run and answers with a fixed result
pub struct RecordingShell {
    output: ShellOutput,
    runs: Mutex<Vec<String>>,
}

impl RecordingShell {
    pub fn succeeding(stdout: &str) -> Self {
        Self::with_output(ShellOutput {
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        })
    }

    pub fn failing(exit_code: i32, stderr: &str) -> Self {
        Self::with_output(ShellOutput {
            exit_code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        })
    }

    fn with_output(output: ShellOutput) -> Self {
        Self {
            output,
            runs: Mutex::new(Vec::new()),
        }
    }

    pub fn runs(&self) -> Vec<String> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShellExecutor for RecordingShell {
    async fn run(&self, command: &str) -> Result<ShellOutput> {
        self.runs.lock().unwrap().push(command.to_string());
        Ok(self.output.clone())
    }
}
