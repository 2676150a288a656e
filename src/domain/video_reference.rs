use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static URL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:https?)://(?P<host>[A-Za-z0-9.-]+)(?::\d{1,5})?(?P<path>/[^?#]*)?(?:\?(?P<query>[^#]*))?(?:#.*)?$")
        .unwrap()
});

static YOUTUBE_PATH_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?:shorts|embed|live)/[A-Za-z0-9_-]+/?$").unwrap()
});

const SHORT_LINK_HOST: &str = "youtu.be";

/// A caller-supplied video locator that passed the media-host shape check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReference {
    url: String,
    host: String,
}

impl VideoReference {
    pub fn parse(raw: &str, accepted_hosts: &[String]) -> Result<Self, VideoReferenceError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(VideoReferenceError::Empty);
        }

        let caps = URL_SHAPE
            .captures(trimmed)
            .ok_or_else(|| VideoReferenceError::NotAUrl(trimmed.to_string()))?;

        let host = caps["host"].to_lowercase();
        if !accepted_hosts.iter().any(|h| h.eq_ignore_ascii_case(&host)) {
            return Err(VideoReferenceError::UnsupportedHost(host));
        }

        let path = caps.name("path").map(|m| m.as_str()).unwrap_or("");
        let query = caps.name("query").map(|m| m.as_str()).unwrap_or("");

        if is_youtube_host(&host) && !has_youtube_locator(&host, path, query) {
            return Err(VideoReferenceError::MissingVideoLocator(trimmed.to_string()));
        }

        Ok(Self {
            url: trimmed.to_string(),
            host,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl fmt::Display for VideoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

fn is_youtube_host(host: &str) -> bool {
    host == SHORT_LINK_HOST || host == "youtube.com" || host.ends_with(".youtube.com")
}

fn has_youtube_locator(host: &str, path: &str, query: &str) -> bool {
    if host == SHORT_LINK_HOST {
        let id = path.trim_matches('/');
        return !id.is_empty() && !id.contains('/');
    }

    if path.trim_end_matches('/') == "/watch" {
        return query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .any(|(key, value)| key == "v" && !value.is_empty());
    }

    YOUTUBE_PATH_ID.is_match(path)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VideoReferenceError {
    #[error("video reference is empty")]
    Empty,
    #[error("not an http(s) url: {0}")]
    NotAUrl(String),
    #[error("unsupported media host: {0}")]
    UnsupportedHost(String),
    #[error("url does not point at a video: {0}")]
    MissingVideoLocator(String),
}
