// Collaborator seams of the download pipeline
//
// Engines, progress observers, the history store and the cloud uploader are
// all trait objects so the orchestrator can be driven end to end with fakes.

use std::path::Path;

use async_trait::async_trait;

use crate::downloader::errors::EngineError;
use crate::downloader::filters::EngineConfig;
use crate::downloader::models::{DownloadOutcome, ProgressUpdate, RemoteFile};

/// One download backend (video extractor, file-host manager, browser
/// automation).
#[async_trait]
pub trait DownloadEngine: Send + Sync {
    /// Stable engine name used in logs and reports.
    fn name(&self) -> &str;

    /// Whether the engine's external tool is present and usable right now.
    async fn is_available(&self) -> bool;

    /// Download one URL with the compiled configuration.
    async fn download(
        &self,
        url: &str,
        config: &EngineConfig,
        observer: &dyn ProgressObserver,
    ) -> Result<DownloadOutcome, EngineError>;
}

/// Advisory telemetry sink. Implementations must be cheap; the pipeline
/// calls these inline.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, _update: &ProgressUpdate) {}

    fn on_log(&self, _line: &str) {}
}

/// Observer that drops everything. Useful default for tests and batch runs
/// where tracing output is enough.
pub struct NullObserver;

impl ProgressObserver for NullObserver {}

/// Duplicate-suppression store keyed by item id (or URL when the engine
/// cannot name individual items).
pub trait HistoryStore: Send + Sync {
    fn is_known(&self, key: &str) -> bool;

    fn record(&self, key: &str) -> Result<(), EngineError>;
}

/// Optional post-download destination. When configured, uploaded artifacts
/// are removed locally on success.
#[async_trait]
pub trait CloudUploader: Send + Sync {
    /// Resolve (creating if needed) the destination folder, returning its id.
    async fn find_or_create_folder(&self, name: &str) -> Result<String, EngineError>;

    async fn upload_file(
        &self,
        local_path: &Path,
        folder_id: &str,
    ) -> Result<RemoteFile, EngineError>;
}
