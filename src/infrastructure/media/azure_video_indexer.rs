use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, multipart};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::application::ports::{MediaIndexer, MediaIndexerError};
use crate::domain::{Evidence, IndexingJob, IndexingStatus, MetadataValue, VideoId};
use crate::presentation::config::VideoIndexerSettings;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(600);
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(50 * 60);

/// Azure AI Video Indexer client: upload, index polling and insight extraction.
pub struct AzureVideoIndexerClient {
    client: Client,
    api_url: String,
    location: String,
    account_id: String,
    subscription_key: String,
    language: String,
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl AzureVideoIndexerClient {
    pub fn new(settings: &VideoIndexerSettings) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client build never fails with valid TLS config");
        Self {
            client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            location: settings.location.clone(),
            account_id: settings.account_id.clone(),
            subscription_key: settings.subscription_key.clone(),
            language: settings.language.clone(),
            token: Mutex::new(None),
        }
    }

    fn account_url(&self) -> String {
        format!(
            "{}/{}/Accounts/{}",
            self.api_url, self.location, self.account_id
        )
    }

    async fn access_token(&self) -> Result<String, MediaIndexerError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let url = format!(
            "{}/Auth/{}/Accounts/{}/AccessToken",
            self.api_url, self.location, self.account_id
        );

        let response = self
            .client
            .get(&url)
            .query(&[("allowEdit", "true")])
            .header("Ocp-Apim-Subscription-Key", &self.subscription_key)
            .send()
            .await
            .map_err(|e| MediaIndexerError::AuthenticationFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MediaIndexerError::AuthenticationFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let value: String = response
            .json()
            .await
            .map_err(|e| MediaIndexerError::AuthenticationFailed(format!("token parse: {}", e)))?;

        tracing::debug!("Video indexer access token refreshed");
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + TOKEN_LIFETIME,
        });
        Ok(value)
    }

    async fn fetch_index(&self, job: &IndexingJob) -> Result<reqwest::Response, MediaIndexerError> {
        let token = self.access_token().await?;
        let url = format!("{}/Videos/{}/Index", self.account_url(), job.as_str());

        let response = self
            .client
            .get(&url)
            .query(&[("accessToken", token.as_str())])
            .send()
            .await
            .map_err(|e| MediaIndexerError::ApiRequestFailed(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(MediaIndexerError::NotFound(job.to_string()));
        }
        Ok(response)
    }
}

#[async_trait]
impl MediaIndexer for AzureVideoIndexerClient {
    #[tracing::instrument(skip(self, path), fields(video_id = %video_id))]
    async fn submit(
        &self,
        path: &Path,
        video_id: VideoId,
    ) -> Result<IndexingJob, MediaIndexerError> {
        let data = tokio::fs::read(path).await?;
        let size = data.len();
        let token = self.access_token().await?;

        let file_part = multipart::Part::bytes(data)
            .file_name(format!("{}.mp4", video_id))
            .mime_str("video/mp4")
            .map_err(|e| MediaIndexerError::UploadFailed(format!("mime: {}", e)))?;
        let form = multipart::Form::new().part("file", file_part);

        let name = video_id.to_string();
        let response = self
            .client
            .post(format!("{}/Videos", self.account_url()))
            .query(&[
                ("name", name.as_str()),
                ("privacy", "Private"),
                ("language", self.language.as_str()),
                ("accessToken", token.as_str()),
            ])
            .timeout(UPLOAD_TIMEOUT)
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaIndexerError::UploadFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MediaIndexerError::UploadFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaIndexerError::InvalidResponse(e.to_string()))?;

        tracing::info!(job = %uploaded.id, bytes = size, "Video uploaded to indexer");
        Ok(IndexingJob::new(uploaded.id))
    }

    #[tracing::instrument(skip(self), fields(job = %job))]
    async fn poll_status(&self, job: &IndexingJob) -> Result<IndexingStatus, MediaIndexerError> {
        let response = self.fetch_index(job).await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("Video indexer throttled the status check");
            return Ok(IndexingStatus::Pending);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MediaIndexerError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let index: VideoIndex = response
            .json()
            .await
            .map_err(|e| MediaIndexerError::InvalidResponse(e.to_string()))?;

        Ok(indexing_status(&index.state))
    }

    #[tracing::instrument(skip(self), fields(job = %job))]
    async fn fetch_result(&self, job: &IndexingJob) -> Result<Evidence, MediaIndexerError> {
        let response = self.fetch_index(job).await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MediaIndexerError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let index: VideoIndex = response
            .json()
            .await
            .map_err(|e| MediaIndexerError::InvalidResponse(e.to_string()))?;

        Ok(evidence_from_index(index))
    }
}

pub fn indexing_status(state: &str) -> IndexingStatus {
    match state {
        "Processed" => IndexingStatus::Processed,
        "Failed" | "Quarantined" => IndexingStatus::Failed,
        _ => IndexingStatus::Pending,
    }
}

/// Flattens the index insights into evidence. OCR lines are de-duplicated
/// keeping first-seen order.
pub fn evidence_from_index(index: VideoIndex) -> Evidence {
    let mut transcript_lines = Vec::new();
    let mut on_screen_text = Vec::new();
    let mut seen = BTreeSet::new();
    let mut language = None;

    for video in index.videos {
        let Some(insights) = video.insights else {
            continue;
        };
        language = language.or(insights.source_language);

        transcript_lines.extend(
            insights
                .transcript
                .into_iter()
                .map(|line| line.text.trim().to_string())
                .filter(|text| !text.is_empty()),
        );

        for line in insights.ocr {
            let text = line.text.trim();
            if !text.is_empty() && seen.insert(text.to_string()) {
                on_screen_text.push(text.to_string());
            }
        }
    }

    let transcript = (!transcript_lines.is_empty()).then(|| transcript_lines.join(" "));
    let mut evidence = Evidence::new(transcript, on_screen_text);

    if let Some(seconds) = index.duration_in_seconds {
        evidence = evidence.with_metadata("duration_seconds", MetadataValue::Number(seconds));
    }
    if let Some(language) = language {
        evidence = evidence.with_metadata("source_language", MetadataValue::Text(language));
    }
    if let Some(name) = index.name {
        evidence = evidence.with_metadata("name", MetadataValue::Text(name));
    }
    evidence
}

#[derive(Deserialize)]
struct UploadResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoIndex {
    pub state: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub duration_in_seconds: Option<f64>,
    #[serde(default)]
    pub videos: Vec<IndexedVideo>,
}

#[derive(Debug, Deserialize)]
pub struct IndexedVideo {
    #[serde(default)]
    pub insights: Option<Insights>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    #[serde(default)]
    pub source_language: Option<String>,
    #[serde(default)]
    pub transcript: Vec<TextLine>,
    #[serde(default)]
    pub ocr: Vec<TextLine>,
}

#[derive(Debug, Deserialize)]
pub struct TextLine {
    pub text: String,
}
