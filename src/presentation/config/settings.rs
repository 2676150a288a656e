use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use super::Environment;
use crate::application::services::{
    AuditConfig, DEFAULT_MAX_CONCURRENT_AUDITS, DEFAULT_MAX_EXCERPT_CHARS,
    DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_MAX_SECTION_CHARS, DEFAULT_MAX_QUERY_CHARS,
    DEFAULT_MAX_WAIT, DEFAULT_POLL_INTERVAL, DEFAULT_RUN_TIMEOUT, DEFAULT_TOP_K, ExtractionConfig,
    FailWithoutFindings, default_accepted_hosts,
};

pub const ENV_PREFIX: &str = "APP";
pub const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub qdrant: QdrantSettings,
    pub embeddings: EmbeddingsSettings,
    pub llm: LlmSettings,
    pub video_indexer: VideoIndexerSettings,
    pub downloader: DownloaderSettings,
    pub audit: AuditSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Loads `appsettings.{environment}.toml` (optional) overlaid by `APP__SECTION__KEY`
    /// environment variables.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.file_suffix()))
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("audit.accepted_hosts"),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub service_name: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            service_name: "vigil".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QdrantSettings {
    pub url: String,
    pub collection_name: String,
    pub min_score: f32,
}

impl Default for QdrantSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            collection_name: "compliance_policies".to_string(),
            min_score: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingsSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
}

impl Default for EmbeddingsSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "text-embedding-3-small".to_string(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    Azure,
    #[serde(rename = "lmstudio")]
    LmStudio,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Azure => "azure",
            LlmProvider::LmStudio => "lmstudio",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub api_key: String,
    pub chat_model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub base_url: Option<String>,
    pub azure_endpoint: Option<String>,
    pub api_version: String,
    pub request_timeout_seconds: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            api_key: String::new(),
            chat_model: "gpt-4o".to_string(),
            max_tokens: 2048,
            temperature: 0.0,
            base_url: None,
            azure_endpoint: None,
            api_version: "2024-06-01".to_string(),
            request_timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoIndexerSettings {
    pub api_url: String,
    pub location: String,
    pub account_id: String,
    pub subscription_key: String,
    pub language: String,
}

impl Default for VideoIndexerSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.videoindexer.ai".to_string(),
            location: "trial".to_string(),
            account_id: String::new(),
            subscription_key: String::new(),
            language: "auto".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloaderSettings {
    pub binary: String,
    pub output_dir: String,
    pub timeout_seconds: u64,
}

impl Default for DownloaderSettings {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            output_dir: std::env::temp_dir().to_string_lossy().into_owned(),
            timeout_seconds: 600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    pub poll_interval_seconds: u64,
    pub max_poll_attempts: u32,
    pub max_wait_seconds: u64,
    pub top_k: usize,
    pub max_query_chars: usize,
    pub max_section_chars: usize,
    pub max_excerpt_chars: usize,
    pub accepted_hosts: Vec<String>,
    pub fail_without_findings: FailWithoutFindings,
    pub max_concurrent_audits: usize,
    pub queue_capacity: usize,
    pub run_timeout_seconds: u64,
    pub job_retention_seconds: u64,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            poll_interval_seconds: DEFAULT_POLL_INTERVAL.as_secs(),
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            max_wait_seconds: DEFAULT_MAX_WAIT.as_secs(),
            top_k: DEFAULT_TOP_K,
            max_query_chars: DEFAULT_MAX_QUERY_CHARS,
            max_section_chars: DEFAULT_MAX_SECTION_CHARS,
            max_excerpt_chars: DEFAULT_MAX_EXCERPT_CHARS,
            accepted_hosts: default_accepted_hosts(),
            fail_without_findings: FailWithoutFindings::default(),
            max_concurrent_audits: DEFAULT_MAX_CONCURRENT_AUDITS,
            queue_capacity: 32,
            run_timeout_seconds: DEFAULT_RUN_TIMEOUT.as_secs(),
            job_retention_seconds: 60 * 60,
        }
    }
}

impl AuditSettings {
    pub fn extraction_config(&self) -> ExtractionConfig {
        ExtractionConfig {
            accepted_hosts: self.accepted_hosts.clone(),
            poll_interval: Duration::from_secs(self.poll_interval_seconds),
            max_poll_attempts: self.max_poll_attempts,
            max_wait: Duration::from_secs(self.max_wait_seconds),
        }
    }

    pub fn audit_config(&self) -> AuditConfig {
        AuditConfig {
            top_k: self.top_k,
            max_query_chars: self.max_query_chars,
            max_section_chars: self.max_section_chars,
            max_excerpt_chars: self.max_excerpt_chars,
            fail_without_findings: self.fail_without_findings,
        }
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_seconds)
    }

    /// How long a completed job stays queryable before it is evicted.
    pub fn job_retention(&self) -> Duration {
        Duration::from_secs(self.job_retention_seconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_json: false,
        }
    }
}
