// Common data models for the download pipeline

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hard ceiling on bulk download counts. Enforced both by the validator and
/// again by the filter compiler.
pub const MAX_DOWNLOADS_CAP: u32 = 500;

/// Which of the three engine families handles a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineChoice {
    /// Video-platform extraction tool (yt-dlp family)
    VideoExtractor,
    /// Generic file-download manager (JDownloader family)
    FileHostManager,
    /// Headless-browser automation, the universal fallback
    BrowserAutomation,
}

impl EngineChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VideoExtractor => "video-extractor",
            Self::FileHostManager => "file-host-manager",
            Self::BrowserAutomation => "browser-automation",
        }
    }
}

/// What a single download request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadScope {
    Single,
    Playlist,
    Channel,
    DateRange,
}

/// User intent for one download request. Built from parsed CLI/UI input or
/// an intent-parser response, consumed once, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadFilter {
    pub content_type: String,
    pub scope: DownloadScope,
    pub quality: String,
    pub max_downloads: Option<u32>,
    /// Free-form date expressions ("2024-12-01", "last week", ...)
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    /// Duration bounds in seconds
    pub min_duration: Option<u32>,
    pub max_duration: Option<u32>,
    /// Case-insensitive title substring lists; exclude wins over include
    pub include_titles: Vec<String>,
    pub exclude_titles: Vec<String>,
    pub min_views: Option<u64>,
    pub max_views: Option<u64>,
    pub download_subtitles: bool,
    pub skip_existing: bool,
    pub max_filesize: Option<SizeLimit>,
}

impl Default for DownloadFilter {
    fn default() -> Self {
        Self {
            content_type: "All Videos".to_string(),
            scope: DownloadScope::Single,
            quality: "Best Available".to_string(),
            max_downloads: None,
            date_from: None,
            date_to: None,
            min_duration: None,
            max_duration: None,
            include_titles: Vec::new(),
            exclude_titles: Vec::new(),
            min_views: None,
            max_views: None,
            download_subtitles: false,
            skip_existing: true,
            max_filesize: None,
        }
    }
}

/// File-size limit, either raw bytes or a human form like "500M" / "2G".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeLimit {
    Bytes(u64),
    Spec(String),
}

/// Lightweight per-item metadata an engine can obtain without downloading.
/// This is everything the accept predicate is allowed to look at.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaProbe {
    pub id: String,
    pub title: String,
    pub webpage_url: String,
    pub original_url: String,
    pub duration_seconds: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub view_count: Option<u64>,
}

/// What an engine reports back for one URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadOutcome {
    pub success: bool,
    pub message: String,
    pub warnings: Vec<String>,
    /// Local artifacts produced by the engine, if it can name them
    pub files: Vec<PathBuf>,
    /// Item identifiers for the history store; empty means "key by URL"
    pub item_ids: Vec<String>,
}

impl DownloadOutcome {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Advisory progress telemetry. Consumed by a UI observer, never by control
/// flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub percentage: f32,
    pub speed: Option<String>,
    pub eta: Option<String>,
    pub filename: Option<String>,
}

/// Remote file descriptor returned by the cloud uploader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    pub remote_id: String,
    pub display_name: String,
    pub view_url: String,
}
