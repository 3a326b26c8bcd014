// File-host engine backed by a running JDownloader instance
//
// No API client: links are handed over through JDownloader's folder-watch
// feature by dropping a .crawljob file into the watch directory. The engine
// reports success once the job file is written; JDownloader owns the rest.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::downloader::errors::EngineError;
use crate::downloader::filters::EngineConfig;
use crate::downloader::models::DownloadOutcome;
use crate::downloader::traits::{DownloadEngine, ProgressObserver};
use crate::downloader::utils::run_output_with_timeout;

pub struct JDownloaderEngine {
    watch_folder: PathBuf,
}

#[derive(Serialize)]
struct CrawlJob {
    text: String,
    #[serde(rename = "downloadFolder")]
    download_folder: String,
    #[serde(rename = "autoStart")]
    auto_start: bool,
    enabled: bool,
}

impl JDownloaderEngine {
    /// Default watch folder under the user's home JDownloader install.
    pub fn new() -> Self {
        let watch_folder = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jd2")
            .join("folderwatch");
        Self { watch_folder }
    }

    pub fn with_watch_folder(watch_folder: impl Into<PathBuf>) -> Self {
        Self {
            watch_folder: watch_folder.into(),
        }
    }

    async fn is_process_running() -> bool {
        #[cfg(target_os = "windows")]
        let (program, args) = ("tasklist", vec![]);
        #[cfg(not(target_os = "windows"))]
        let (program, args) = ("pgrep", vec!["-f".to_string(), "JDownloader".to_string()]);

        match run_output_with_timeout(program, args, 10).await {
            Ok(output) => {
                #[cfg(target_os = "windows")]
                return String::from_utf8_lossy(&output.stdout)
                    .to_lowercase()
                    .contains("jdownloader");
                #[cfg(not(target_os = "windows"))]
                output.status.success()
            }
            Err(_) => false,
        }
    }
}

impl Default for JDownloaderEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DownloadEngine for JDownloaderEngine {
    fn name(&self) -> &str {
        "jdownloader"
    }

    async fn is_available(&self) -> bool {
        Self::is_process_running().await
    }

    async fn download(
        &self,
        url: &str,
        config: &EngineConfig,
        observer: &dyn ProgressObserver,
    ) -> Result<DownloadOutcome, EngineError> {
        if !Self::is_process_running().await {
            return Err(EngineError::Unavailable(
                "JDownloader is not running".to_string(),
            ));
        }

        // Download folder is the directory part of the output template.
        let download_folder = PathBuf::from(&config.output_template)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        let job = CrawlJob {
            text: url.to_string(),
            download_folder,
            auto_start: true,
            enabled: true,
        };
        let body = serde_json::to_string_pretty(&job)
            .map_err(|e| EngineError::ParseError(format!("crawljob serialize: {}", e)))?;

        std::fs::create_dir_all(&self.watch_folder).map_err(|e| {
            EngineError::ExecutionFailed(format!("Cannot create watch folder: {}", e))
        })?;
        let job_path = self.watch_folder.join(format!(
            "omnistream_{}.crawljob",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default()
        ));
        std::fs::write(&job_path, body)
            .map_err(|e| EngineError::ExecutionFailed(format!("Cannot write crawljob: {}", e)))?;

        debug!(engine = self.name(), path = %job_path.display(), "crawljob written");
        observer.on_log(&format!("Queued in JDownloader: {}", url));
        info!(engine = self.name(), %url, "link handed to JDownloader");

        Ok(DownloadOutcome::succeeded(
            "Link queued in JDownloader watch folder",
        ))
    }
}
