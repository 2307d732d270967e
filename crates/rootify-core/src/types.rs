use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single dictionary entry as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRoot {
    pub chinese: String,
    pub english: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One unit of segmentation output.
///
/// An unknown segment always carries exactly one code point and an empty gloss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub chinese: String,
    pub english: String,
    pub is_unknown: bool,
}

impl Segment {
    pub fn known(chinese: impl Into<String>, english: impl Into<String>) -> Self {
        Self {
            chinese: chinese.into(),
            english: english.into(),
            is_unknown: false,
        }
    }

    pub fn unknown(ch: char) -> Self {
        Self {
            chinese: ch.to_string(),
            english: String::new(),
            is_unknown: true,
        }
    }

    /// Text shown for this segment in a joined translation: the gloss, or the
    /// original character when there is none.
    pub fn display(&self) -> &str {
        if self.english.is_empty() {
            &self.chinese
        } else {
            &self.english
        }
    }
}
