mod audit;
pub mod audit_dto;
mod audit_job;
mod health;

pub use audit::audit_handler;
pub use audit_job::{audit_job_status_handler, submit_audit_job_handler};
pub use health::health_handler;
