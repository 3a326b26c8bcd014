// Download engine implementations

pub mod browser;
pub mod jdownloader;
pub mod ytdlp;

use std::sync::Arc;

use crate::downloader::models::EngineChoice;
use crate::downloader::traits::DownloadEngine;

pub use browser::BrowserEngine;
pub use jdownloader::JDownloaderEngine;
pub use ytdlp::YtDlpEngine;

/// The three engine families the router can choose between.
#[derive(Clone)]
pub struct EngineSet {
    pub video: Arc<dyn DownloadEngine>,
    pub file_host: Arc<dyn DownloadEngine>,
    pub browser: Arc<dyn DownloadEngine>,
}

impl EngineSet {
    pub fn select(&self, choice: EngineChoice) -> Arc<dyn DownloadEngine> {
        match choice {
            EngineChoice::VideoExtractor => Arc::clone(&self.video),
            EngineChoice::FileHostManager => Arc::clone(&self.file_host),
            EngineChoice::BrowserAutomation => Arc::clone(&self.browser),
        }
    }
}
