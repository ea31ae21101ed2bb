// Records new commands into the store
//
// Validates the request, embeds the description, then writes text and
// vector together.

use crate::db::{AddRequest, Database};
use crate::embeddings::EmbeddingProvider;
use crate::error::{FastCmdError, Result};
use std::sync::Arc;

// Nobody needs a 10KB command.
const MAX_COMMAND_LENGTH: usize = 10_000;

pub struct Recorder {
    db: Arc<Database>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Recorder {
    pub fn new(db: Arc<Database>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { db, embedder }
    }

    // Main recording function. Checks the request, embeds it, saves it.
    // The command itself is stored exactly as given.
    pub async fn record(&self, request: &AddRequest) -> Result<i64> {
        let description = self.validate(request)?;

        let embedding = self.embedder.embed(description).await?;

        self.db
            .insert_entry(&embedding, &request.command, description)
            .await
    }

    // Both fields must have something in them. The description loses its
    // surrounding whitespace since that is what gets embedded.
    fn validate<'a>(&self, request: &'a AddRequest) -> Result<&'a str> {
        let description = request.description.trim();
        if description.is_empty() {
            return Err(FastCmdError::InvalidInput("description cannot be empty".to_string()));
        }

        if request.command.trim().is_empty() {
            return Err(FastCmdError::InvalidInput("command cannot be empty".to_string()));
        }

        if request.command.len() > MAX_COMMAND_LENGTH {
            return Err(FastCmdError::InvalidInput(format!(
                "command exceeds maximum length of {} characters",
                MAX_COMMAND_LENGTH
            )));
        }

        Ok(description)
    }
}
