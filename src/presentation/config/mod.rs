mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AuditSettings, DownloaderSettings, ENV_PREFIX, ENV_SEPARATOR, EmbeddingsSettings,
    LlmProvider, LlmSettings, LoggingSettings, QdrantSettings, ServerSettings, Settings,
    VideoIndexerSettings,
};
