// Natural-language intent bridge
//
// An external parser (LLM, rule engine, anything) turns a free-form request
// like "grab the last 20 shorts from this channel" into a structured intent
// with a confidence score. Low-confidence intents are rejected here rather
// than silently producing a surprising filter.

use serde::{Deserialize, Serialize};

use crate::downloader::models::{DownloadFilter, DownloadScope};

/// Minimum confidence (0-100) required before an intent is trusted.
pub const MIN_CONFIDENCE: u8 = 70;

/// Structured output of a natural-language request parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedIntent {
    /// Parser's self-reported confidence, 0-100
    pub confidence: u8,
    pub content_type: Option<String>,
    pub quality: Option<String>,
    pub max_downloads: Option<u32>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub include_titles: Vec<String>,
    pub exclude_titles: Vec<String>,
    pub audio_only: bool,
}

/// Seam for the actual parser implementation.
pub trait IntentParser: Send + Sync {
    fn parse(&self, request: &str) -> Option<ParsedIntent>;
}

/// Turn a parsed intent into a download filter. Returns `None` when the
/// parser was not confident enough; the caller should fall back to explicit
/// filter input rather than guessing.
pub fn filter_from_intent(intent: &ParsedIntent) -> Option<DownloadFilter> {
    if intent.confidence < MIN_CONFIDENCE {
        return None;
    }

    let mut filter = DownloadFilter::default();

    if intent.audio_only {
        filter.content_type = "Audio Only".to_string();
    } else if let Some(content_type) = &intent.content_type {
        filter.content_type = content_type.clone();
    }
    if let Some(quality) = &intent.quality {
        filter.quality = quality.clone();
    }
    filter.max_downloads = intent.max_downloads;
    filter.date_from = intent.date_from.clone();
    filter.date_to = intent.date_to.clone();
    filter.include_titles = intent.include_titles.clone();
    filter.exclude_titles = intent.exclude_titles.clone();

    if filter.max_downloads.is_some() || filter.date_from.is_some() {
        filter.scope = DownloadScope::DateRange;
    }

    Some(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(confidence: u8) -> ParsedIntent {
        ParsedIntent {
            confidence,
            content_type: Some("Shorts Only".to_string()),
            quality: None,
            max_downloads: Some(20),
            date_from: Some("last week".to_string()),
            date_to: None,
            include_titles: Vec::new(),
            exclude_titles: vec!["live".to_string()],
            audio_only: false,
        }
    }

    #[test]
    fn confident_intent_becomes_filter() {
        let filter = filter_from_intent(&intent(85)).unwrap();
        assert_eq!(filter.content_type, "Shorts Only");
        assert_eq!(filter.max_downloads, Some(20));
        assert_eq!(filter.date_from.as_deref(), Some("last week"));
        assert_eq!(filter.exclude_titles, vec!["live"]);
        assert_eq!(filter.scope, DownloadScope::DateRange);
    }

    #[test]
    fn low_confidence_is_rejected() {
        assert!(filter_from_intent(&intent(69)).is_none());
        assert!(filter_from_intent(&intent(MIN_CONFIDENCE)).is_some());
    }

    #[test]
    fn audio_only_overrides_content_type() {
        let mut parsed = intent(90);
        parsed.audio_only = true;
        let filter = filter_from_intent(&parsed).unwrap();
        assert_eq!(filter.content_type, "Audio Only");
    }

    #[test]
    fn sparse_intent_keeps_defaults() {
        let parsed = ParsedIntent {
            confidence: 80,
            content_type: None,
            quality: None,
            max_downloads: None,
            date_from: None,
            date_to: None,
            include_titles: Vec::new(),
            exclude_titles: Vec::new(),
            audio_only: false,
        };
        let filter = filter_from_intent(&parsed).unwrap();
        assert_eq!(filter, DownloadFilter::default());
    }
}
