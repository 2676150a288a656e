mod audit_job_repository;
mod embedder;
mod llm_client;
mod media_downloader;
mod media_indexer;
mod policy_retriever;
mod repository_error;
mod search_result;
mod vector_store;
mod vector_store_error;

pub use audit_job_repository::AuditJobRepository;
pub use embedder::{Embedder, EmbedderError};
pub use llm_client::{LlmClient, LlmClientError};
pub use media_downloader::{DownloadError, MediaDownloader};
pub use media_indexer::{MediaIndexer, MediaIndexerError};
pub use policy_retriever::{PolicyRetriever, RetrievalError};
pub use repository_error::RepositoryError;
pub use search_result::SearchResult;
pub use vector_store::VectorStore;
pub use vector_store_error::VectorStoreError;
