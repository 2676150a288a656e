#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("collection not found: {0}")]
    CollectionMissing(String),
    #[error("search failed: {0}")]
    SearchFailed(String),
}
