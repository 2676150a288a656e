mod audit_error;
mod audit_prompt;
mod audit_stage;
mod audit_worker;
mod cancellation;
mod extraction_stage;
mod local_artifact;
pub mod response_parser;
mod retrieval_service;
mod workflow_engine;

pub use audit_error::{AuditError, UNSUBMITTED_JOB};
pub use audit_prompt::{SYSTEM_INSTRUCTION, build_prompt, build_query, truncate_chars};
pub use audit_stage::{
    AuditConfig, AuditStage, DEFAULT_MAX_EXCERPT_CHARS, DEFAULT_MAX_SECTION_CHARS,
    DEFAULT_MAX_QUERY_CHARS, DEFAULT_TOP_K, FailWithoutFindings,
};
pub use audit_worker::{
    AuditMessage, AuditWorker, AuditWorkerError, DEFAULT_MAX_CONCURRENT_AUDITS, DEFAULT_RUN_TIMEOUT,
};
pub use extraction_stage::{
    DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_MAX_WAIT, DEFAULT_POLL_INTERVAL, ExtractionConfig,
    ExtractionStage, default_accepted_hosts,
};
pub use local_artifact::LocalArtifact;
pub use response_parser::{ParseError, ParsedVerdict, excerpt, parse_verdict, strip_code_fence};
pub use retrieval_service::RetrievalService;
pub use workflow_engine::{WorkflowEngine, WorkflowPhase};
