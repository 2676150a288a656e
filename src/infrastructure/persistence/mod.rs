mod qdrant_adapter;
mod repositories;

pub use qdrant_adapter::QdrantAdapter;
pub use repositories::InMemoryAuditJobRepository;
