// Browser-automation engine, the universal fallback
//
// Drives an external headless-browser helper: any executable that accepts
// `<url> <output-dir>` and prints saved file paths, one per line, on stdout.
// Slow and heavyweight, so it only runs when the specialized engines cannot.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::downloader::errors::EngineError;
use crate::downloader::filters::EngineConfig;
use crate::downloader::models::DownloadOutcome;
use crate::downloader::traits::{DownloadEngine, ProgressObserver};
use crate::downloader::utils::{find_binary, run_output_with_timeout};

const DEFAULT_HELPER: &str = "omnistream-browser-helper";
const DEFAULT_TIMEOUT_SECS: u64 = 900;

pub struct BrowserEngine {
    helper: String,
    timeout_secs: u64,
}

impl BrowserEngine {
    pub fn new() -> Self {
        Self::with_helper(DEFAULT_HELPER)
    }

    pub fn with_helper(helper: impl Into<String>) -> Self {
        Self {
            helper: helper.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }
}

impl Default for BrowserEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DownloadEngine for BrowserEngine {
    fn name(&self) -> &str {
        "browser-automation"
    }

    async fn is_available(&self) -> bool {
        find_binary(&self.helper).is_some()
    }

    async fn download(
        &self,
        url: &str,
        config: &EngineConfig,
        observer: &dyn ProgressObserver,
    ) -> Result<DownloadOutcome, EngineError> {
        let helper = find_binary(&self.helper)
            .ok_or_else(|| EngineError::ToolNotFound(self.helper.clone()))?;

        let output_dir = PathBuf::from(&config.output_template)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string());

        let args = vec![url.to_string(), output_dir];
        debug!(engine = self.name(), %url, "running browser helper");

        let output = run_output_with_timeout(
            &helper.to_string_lossy(),
            args,
            self.timeout_secs,
        )
        .await
        .map_err(EngineError::from)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::from(stderr.to_string()));
        }

        let mut outcome = DownloadOutcome::succeeded("Browser capture finished");
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            observer.on_log(line);
            let line = line.trim();
            if !line.is_empty() {
                outcome.files.push(line.into());
            }
        }

        info!(
            engine = self.name(),
            files = outcome.files.len(),
            "browser capture complete"
        );
        Ok(outcome)
    }
}
