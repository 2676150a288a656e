mod audit_job;
mod audit_state;
mod embedding;
mod evidence;
mod finding;
mod indexing_status;
mod job_id;
mod policy_fragment;
mod verdict;
mod video_id;
mod video_reference;

pub use audit_job::{AuditJob, AuditJobStatus};
pub use audit_state::{AuditState, FinalStatus};
pub use embedding::Embedding;
pub use evidence::{Evidence, MetadataValue};
pub use finding::{Finding, Severity};
pub use indexing_status::{IndexingJob, IndexingStatus};
pub use job_id::JobId;
pub use policy_fragment::PolicyFragment;
pub use verdict::{Verdict, VerdictStatus};
pub use video_id::VideoId;
pub use video_reference::{VideoReference, VideoReferenceError};
