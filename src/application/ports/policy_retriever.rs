use async_trait::async_trait;

use super::{EmbedderError, VectorStoreError};

/// Looks up the policy passages most relevant to a piece of evidence.
#[async_trait]
pub trait PolicyRetriever: Send + Sync {
    /// Returns at most `top_k` fragment texts, most relevant first. May be empty.
    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<String>, RetrievalError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("embedding: {0}")]
    Embedding(EmbedderError),
    #[error("search: {0}")]
    Search(#[from] VectorStoreError),
}
