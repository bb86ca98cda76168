use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One news story as it appears in a corpus file. Only `title` and
/// `content` are required by the pipeline; every other key a record
/// carries rides along in `extra` and is written back out unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Story {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Story {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            date: None,
            author: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Whether the story carries any body text at all. Stories without
    /// content are skipped by every oracle-backed stage.
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    /// Title truncated for progress lines.
    pub fn short_title(&self, max_chars: usize) -> &str {
        crate::text::truncate_chars(&self.title, max_chars)
    }
}
