use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{Embedder, PolicyRetriever, RetrievalError, VectorStore};

/// Embeds the query and returns the texts of the closest policy fragments.
pub struct RetrievalService<V>
where
    V: VectorStore,
{
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<V>,
    min_score: f32,
}

impl<V> RetrievalService<V>
where
    V: VectorStore,
{
    pub fn new(embedder: Arc<dyn Embedder>, vector_store: Arc<V>, min_score: f32) -> Self {
        Self {
            embedder,
            vector_store,
            min_score,
        }
    }
}

#[async_trait]
impl<V> PolicyRetriever for RetrievalService<V>
where
    V: VectorStore + 'static,
{
    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<String>, RetrievalError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .embed(text)
            .await
            .map_err(RetrievalError::Embedding)?;

        let results = self.vector_store.search(&query_embedding, top_k).await?;

        let total = results.len();
        let fragments: Vec<String> = results
            .into_iter()
            .filter(|r| r.score >= self.min_score)
            .take(top_k)
            .map(|r| r.fragment.text)
            .collect();

        tracing::debug!(
            hits = total,
            kept = fragments.len(),
            min_score = self.min_score,
            "Vector search completed"
        );

        Ok(fragments)
    }
}
