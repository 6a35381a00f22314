//! News article type shared across providers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news article as returned by a provider
///
/// Matches the citation shape used by downstream reporting: title and URL are
/// required, publisher and publication time are provider-dependent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl NewsArticle {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            publisher: None,
            published_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_omitted() {
        let json = serde_json::to_string(&NewsArticle::new("Title", "https://example.com")).expect("json");
        assert!(!json.contains("publisher"));
        assert!(!json.contains("publishedAt"));
    }
}
