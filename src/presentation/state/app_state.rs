use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::ports::AuditJobRepository;
use crate::application::services::AuditMessage;
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub audit_sender: mpsc::Sender<AuditMessage>,
    pub job_repository: Arc<dyn AuditJobRepository>,
    pub settings: Arc<Settings>,
}
