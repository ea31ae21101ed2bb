/// Embedding providers
///
/// Turn a description into a fixed-length vector. The store only ever sees
/// the `EmbeddingProvider` trait; the concrete provider is chosen at startup.

pub mod openai;

pub use openai::OpenAiEmbeddings;

use crate::error::Result;
use async_trait::async_trait;

/// Anything that can embed text
///
/// Implementations fail with `InvalidInput` on empty text and with
/// `EmbeddingUnavailable` when the backend can't be reached or rejects
/// the credential. Callers do not retry.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Length of every vector this provider returns
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
