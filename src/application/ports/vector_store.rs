use async_trait::async_trait;

use super::{SearchResult, VectorStoreError};
use crate::domain::Embedding;

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn collection_exists(&self) -> Result<bool, VectorStoreError>;

    async fn search(
        &self,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, VectorStoreError>;
}
