/// Semantic command search
///
/// Embeds the query text and asks the store for its nearest entries.

use crate::db::{Database, MatchResult};
use crate::embeddings::EmbeddingProvider;
use crate::error::{FastCmdError, Result};
use std::sync::Arc;

/// Handles command searching by embedding distance
pub struct Searcher {
    db: Arc<Database>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Searcher {
    /// Create a new searcher instance
    pub fn new(db: Arc<Database>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { db, embedder }
    }

    /// Search commands by meaning
    ///
    /// # Arguments
    /// * `query_text` - What the user wants to do, in their own words
    /// * `top_k` - Maximum results to return, at least 1
    ///
    /// # Returns
    /// * `Ok(Vec<MatchResult>)` - Nearest first; empty when nothing is stored
    pub async fn search(&self, query_text: &str, top_k: usize) -> Result<Vec<MatchResult>> {
        let query_text = query_text.trim();
        if query_text.is_empty() {
            return Err(FastCmdError::InvalidInput("search text cannot be empty".to_string()));
        }

        let query_embedding = self.embedder.embed(query_text).await?;

        self.db.nearest(&query_embedding, top_k).await
    }
}
