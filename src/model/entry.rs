use serde::{Deserialize, Serialize};
use std::fmt;

/// One birth record from the feed. Identity is the (text, year) pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    pub text: String,
    pub year: i64,
}

impl Entry {
    pub fn new(text: impl Into<String>, year: i64) -> Self {
        Self {
            text: text.into(),
            year,
        }
    }

    /// Builds an entry from a raw feed item, dropping anything without a
    /// non-empty string `text` and an integer `year`.
    pub fn from_feed_value(value: &serde_json::Value) -> Option<Self> {
        let text = value.get("text")?.as_str()?;
        if text.is_empty() {
            return None;
        }
        let year = value.get("year")?.as_i64()?;
        Some(Self::new(text, year))
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.text, self.year)
    }
}
