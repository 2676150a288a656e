use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Flag(bool),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(v) => write!(f, "{}", v),
            MetadataValue::Integer(v) => write!(f, "{}", v),
            MetadataValue::Number(v) => write!(f, "{}", v),
            MetadataValue::Flag(v) => write!(f, "{}", v),
        }
    }
}

/// Text pulled out of a video by the indexing service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evidence {
    pub transcript: Option<String>,
    pub on_screen_text: Vec<String>,
    pub metadata: BTreeMap<String, MetadataValue>,
}

impl Evidence {
    pub fn new(transcript: Option<String>, on_screen_text: Vec<String>) -> Self {
        Self {
            transcript,
            on_screen_text,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Transcript with surrounding whitespace removed, `None` when blank.
    pub fn usable_transcript(&self) -> Option<&str> {
        self.transcript
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
