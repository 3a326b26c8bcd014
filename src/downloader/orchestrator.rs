// Batch orchestrator
//
// Drives the full pipeline for a list of URLs: validate the filter once,
// then per URL detect the site, compile the engine configuration, route to
// an engine, download with a one-shot browser fallback, record history and
// optionally upload artifacts. URLs are processed sequentially; the stop
// flag is honored at URL boundaries only.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::Rng;
use time::Date;
use tracing::{info, warn};

use super::engines::EngineSet;
use super::models::{DownloadFilter, DownloadOutcome, EngineChoice};
use super::traits::{CloudUploader, HistoryStore, NullObserver, ProgressObserver};
use super::{filters, router, sites, validator};

/// Anti-rate-limit pacing between downloads from the same risky platform
/// or within bulk jobs.
#[derive(Debug, Clone)]
pub struct PacingPolicy {
    pub min_secs: u64,
    pub max_secs: u64,
    pub enabled: bool,
}

impl PacingPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    fn pick_delay_secs(&self) -> u64 {
        rand::thread_rng().gen_range(self.min_secs..=self.max_secs)
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            min_secs: 5,
            max_secs: 15,
            enabled: true,
        }
    }
}

// Platforms with aggressive automation detection.
const HIGH_RISK_SITES: &[&str] = &["tiktok", "instagram"];

/// Final state of one URL in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlState {
    Done,
    Failed,
    Skipped,
}

/// Per-URL result of a batch run.
#[derive(Debug, Clone)]
pub struct UrlReport {
    pub url: String,
    pub engine: Option<EngineChoice>,
    pub state: UrlState,
    pub message: String,
    pub warnings: Vec<String>,
    pub fallback_used: bool,
    pub files: Vec<PathBuf>,
}

/// Aggregate result of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub success_count: usize,
    pub failure_count: usize,
    pub skipped_count: usize,
    pub reports: Vec<UrlReport>,
}

impl BatchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failure_count == 0
    }
}

pub struct Orchestrator {
    engines: EngineSet,
    history: Arc<dyn HistoryStore>,
    uploader: Option<Arc<dyn CloudUploader>>,
    observer: Arc<dyn ProgressObserver>,
    pacing: PacingPolicy,
    engine_override: Option<EngineChoice>,
    stop: Arc<AtomicBool>,
    output_root: PathBuf,
    today: Date,
}

impl Orchestrator {
    pub fn new(
        engines: EngineSet,
        history: Arc<dyn HistoryStore>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engines,
            history,
            uploader: None,
            observer: Arc::new(NullObserver),
            pacing: PacingPolicy::default(),
            engine_override: None,
            stop: Arc::new(AtomicBool::new(false)),
            output_root: output_root.into(),
            today: time::OffsetDateTime::now_utc().date(),
        }
    }

    pub fn with_uploader(mut self, uploader: Arc<dyn CloudUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    /// Force every URL through one engine, bypassing the router.
    pub fn with_engine_override(mut self, choice: EngineChoice) -> Self {
        self.engine_override = Some(choice);
        self
    }

    /// Reference date used to resolve relative date expressions.
    pub fn with_today(mut self, today: Date) -> Self {
        self.today = today;
        self
    }

    /// Cooperative cancellation handle. Setting it stops the batch before
    /// the next URL; the in-flight download is allowed to finish.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Process URLs sequentially with a shared filter.
    pub async fn run_batch(&self, urls: &[String], filter: &DownloadFilter) -> BatchSummary {
        let (filter, filter_warnings) = validator::validate(filter, self.today);
        for warning in &filter_warnings {
            warn!("{}", warning);
            self.observer.on_log(warning);
        }

        let mut summary = BatchSummary::default();
        let mut previous_high_risk = false;

        for (index, url) in urls.iter().enumerate() {
            if self.stop.load(Ordering::SeqCst) {
                info!("stop requested, leaving {} urls unprocessed", urls.len() - index);
                break;
            }

            if self.history.is_known(url) {
                info!(%url, "already in history, skipping");
                summary.skipped_count += 1;
                summary.reports.push(UrlReport {
                    url: url.clone(),
                    engine: None,
                    state: UrlState::Skipped,
                    message: "Already downloaded".to_string(),
                    warnings: Vec::new(),
                    fallback_used: false,
                    files: Vec::new(),
                });
                continue;
            }

            let site = sites::detect(url);
            let high_risk = HIGH_RISK_SITES.contains(&site.key);
            let needs_pacing = sites::is_bulk_url(url) || (index > 0 && high_risk && previous_high_risk);
            if self.pacing.enabled && needs_pacing {
                let delay = self.pacing.pick_delay_secs();
                info!(%url, delay_secs = delay, "pacing before download");
                tokio::time::sleep(tokio::time::Duration::from_secs(delay)).await;
            }
            previous_high_risk = high_risk;

            let mut report = self.process_url(url, &filter, site).await;
            report.warnings.splice(0..0, filter_warnings.iter().cloned());
            match report.state {
                UrlState::Done => summary.success_count += 1,
                UrlState::Failed => summary.failure_count += 1,
                UrlState::Skipped => summary.skipped_count += 1,
            }
            summary.reports.push(report);
        }

        summary
    }

    async fn process_url(
        &self,
        url: &str,
        filter: &DownloadFilter,
        site: &sites::SiteCapability,
    ) -> UrlReport {
        let config = filters::compile(filter, site, &self.output_root, self.today);
        let choice = self
            .engine_override
            .unwrap_or_else(|| router::choose_engine(url));
        info!(%url, site = site.key, engine = choice.as_str(), "dispatching");

        let mut report = UrlReport {
            url: url.to_string(),
            engine: Some(choice),
            state: UrlState::Failed,
            message: String::new(),
            warnings: Vec::new(),
            fallback_used: false,
            files: Vec::new(),
        };

        let engine = self.engines.select(choice);
        let mut result = engine.download(url, &config, self.observer.as_ref()).await;

        // One-shot fallback: an unavailable specialized engine is replaced
        // by browser automation exactly once, never recursively.
        if let Err(error) = &result {
            if error.is_unavailable() && choice != EngineChoice::BrowserAutomation {
                warn!(%url, %error, "engine unavailable, falling back to browser automation");
                report.fallback_used = true;
                report.engine = Some(EngineChoice::BrowserAutomation);
                result = self
                    .engines
                    .browser
                    .download(url, &config, self.observer.as_ref())
                    .await;
            }
        }

        match result {
            Ok(outcome) => {
                report.warnings.extend(outcome.warnings.iter().cloned());
                self.record_history(url, &outcome, site);
                let retained = self.upload_artifacts(&outcome, site, &mut report).await;
                report.files = retained;
                report.state = UrlState::Done;
                report.message = outcome.message;
            }
            Err(error) => {
                warn!(%url, %error, "download failed");
                report.state = UrlState::Failed;
                report.message = error.to_string();
            }
        }

        report
    }

    // History is keyed by the item ids an engine reports, or by the URL
    // itself when the engine cannot name individual items.
    fn record_history(&self, url: &str, outcome: &DownloadOutcome, site: &sites::SiteCapability) {
        let mut keys: Vec<&str> = outcome.item_ids.iter().map(String::as_str).collect();
        if keys.is_empty() {
            keys.push(url);
        }
        for key in keys {
            if let Err(error) = self.history.record(key) {
                warn!(site = site.key, key, %error, "failed to record history entry");
            }
        }
    }

    // Uploaded files are deleted locally; failed uploads leave the file in
    // place and attach a warning. Returns the files still present locally.
    async fn upload_artifacts(
        &self,
        outcome: &DownloadOutcome,
        site: &sites::SiteCapability,
        report: &mut UrlReport,
    ) -> Vec<PathBuf> {
        let uploader = match &self.uploader {
            Some(uploader) => uploader,
            None => return outcome.files.clone(),
        };

        let folder_id = match uploader.find_or_create_folder(site.display_name).await {
            Ok(id) => id,
            Err(error) => {
                report
                    .warnings
                    .push(format!("Upload folder unavailable: {}", error));
                return outcome.files.clone();
            }
        };

        let mut retained = Vec::new();
        for file in &outcome.files {
            match uploader.upload_file(file, &folder_id).await {
                Ok(remote) => {
                    info!(file = %file.display(), remote = %remote.view_url, "uploaded");
                    if let Err(error) = std::fs::remove_file(file) {
                        report.warnings.push(format!(
                            "Uploaded but could not remove local copy {}: {}",
                            file.display(),
                            error
                        ));
                        retained.push(file.clone());
                    }
                }
                Err(error) => {
                    report
                        .warnings
                        .push(format!("Upload failed for {}: {}", file.display(), error));
                    retained.push(file.clone());
                }
            }
        }
        retained
    }
}
