use serde::{Serialize, Serializer};
use std::fmt;

/// Placeholder written for any field that could not be extracted.
pub const NOT_AVAILABLE: &str = "N/A";

// ============================================================================
// Field values
// ============================================================================

/// One record cell: an extracted, non-empty value or the sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    Present(String),
    #[default]
    Missing,
}

impl FieldValue {
    /// Builds a value from raw text; blank text and the sentinel itself collapse to `Missing`.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == NOT_AVAILABLE {
            FieldValue::Missing
        } else if trimmed.len() == text.len() {
            FieldValue::Present(text)
        } else {
            FieldValue::Present(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldValue::Present(v) => v,
            FieldValue::Missing => NOT_AVAILABLE,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, FieldValue::Present(_))
    }

    /// Applies `f` to a present value, re-validating the result.
    pub fn map(self, f: impl FnOnce(&str) -> String) -> Self {
        match self {
            FieldValue::Present(v) => FieldValue::from_text(f(&v)),
            FieldValue::Missing => FieldValue::Missing,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// Records
// ============================================================================

/// Rows with a fixed column schema. Field declaration order must follow `COLUMNS`.
pub trait TabularRecord: Serialize {
    const COLUMNS: &'static [&'static str];
}

/// Metadata for a single watch page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoRecord {
    pub title: FieldValue,
    pub channel: FieldValue,
    pub view: FieldValue,
    pub likes: FieldValue,
    pub comments: FieldValue,
    pub publish_date: FieldValue,
    pub url: String,
}

impl VideoRecord {
    /// Record for a target whose page never became usable.
    pub fn unavailable(url: impl Into<String>) -> Self {
        Self {
            title: FieldValue::Missing,
            channel: FieldValue::Missing,
            view: FieldValue::Missing,
            likes: FieldValue::Missing,
            comments: FieldValue::Missing,
            publish_date: FieldValue::Missing,
            url: url.into(),
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("channel", &self.channel),
            ("view", &self.view),
            ("likes", &self.likes),
            ("comments", &self.comments),
            ("publish_date", &self.publish_date),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_present())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

impl TabularRecord for VideoRecord {
    const COLUMNS: &'static [&'static str] =
        &["title", "channel", "view", "likes", "comments", "publish_date", "url"];
}

/// One entry of a playlist page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistRecord {
    pub title: FieldValue,
    pub channel: FieldValue,
    pub view: FieldValue,
    /// Absolute watch link; `Missing` when the entry carries no href.
    pub url: FieldValue,
}

impl TabularRecord for PlaylistRecord {
    const COLUMNS: &'static [&'static str] = &["title", "channel", "view", "url"];
}

// ============================================================================
// Targets
// ============================================================================

/// An address to scrape, with an optional cap on playlist entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub url: String,
    pub cap: Option<usize>,
}

impl Target {
    pub fn video(url: impl Into<String>) -> Self {
        Self { url: url.into(), cap: None }
    }

    pub fn playlist(url: impl Into<String>, cap: Option<usize>) -> Self {
        Self { url: url.into(), cap }
    }
}

/// Video targets from raw addresses, trimmed, with blank ones dropped.
pub fn video_targets<'a>(addresses: impl IntoIterator<Item = &'a str>) -> Vec<Target> {
    addresses
        .into_iter()
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(Target::video)
        .collect()
}

/// Parses an address list: one per line, blank lines and `#` comments skipped.
pub fn parse_target_list(text: &str) -> Vec<Target> {
    video_targets(text.lines().filter(|line| !line.trim_start().starts_with('#')))
}
