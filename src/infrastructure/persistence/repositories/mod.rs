mod in_memory_audit_job_repository;

pub use in_memory_audit_job_repository::InMemoryAuditJobRepository;
