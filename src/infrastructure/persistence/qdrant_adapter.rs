use std::sync::Arc;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::SearchPointsBuilder;
use tracing::instrument;

use crate::application::ports::{SearchResult, VectorStore, VectorStoreError};
use crate::domain::{Embedding, PolicyFragment};

/// Read-only view over a Qdrant collection of policy passages.
///
/// Points carry a `text` payload plus optional `source` and `page`.
pub struct QdrantAdapter {
    client: Arc<Qdrant>,
    collection_name: String,
}

impl QdrantAdapter {
    pub async fn new(url: &str, collection_name: String) -> Result<Self, VectorStoreError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| VectorStoreError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            collection_name,
        })
    }
}

#[async_trait]
impl VectorStore for QdrantAdapter {
    #[instrument(skip(self), fields(collection = %self.collection_name))]
    async fn collection_exists(&self) -> Result<bool, VectorStoreError> {
        self.client
            .collection_exists(&self.collection_name)
            .await
            .map_err(|e| VectorStoreError::ConnectionFailed(e.to_string()))
    }

    #[instrument(skip(self, embedding), fields(collection = %self.collection_name, top_k = top_k))]
    async fn search(
        &self,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        let search_result = self
            .client
            .search_points(
                SearchPointsBuilder::new(
                    &self.collection_name,
                    embedding.values.clone(),
                    top_k as u64,
                )
                .with_payload(true),
            )
            .await
            .map_err(|e| VectorStoreError::SearchFailed(e.to_string()))?;

        let results: Vec<SearchResult> = search_result
            .result
            .into_iter()
            .filter_map(|point| {
                let payload = point.payload;

                let text = payload.get("text")?.as_str()?.to_string();
                let source = payload
                    .get("source")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string());
                let page = payload
                    .get("page")
                    .and_then(|v| v.as_integer())
                    .and_then(|v| u32::try_from(v).ok());

                Some(SearchResult {
                    fragment: PolicyFragment::new(text, source, page),
                    score: point.score,
                })
            })
            .collect();

        Ok(results)
    }
}
