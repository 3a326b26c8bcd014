// Video-extractor engine wrapping the yt-dlp binary
//
// Translates the compiled engine configuration into a yt-dlp argument list,
// streams nothing (batch invocation with --newline output parsed after the
// fact) and reports produced files from "Destination:" lines.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::downloader::errors::EngineError;
use crate::downloader::filters::{EngineConfig, AUDIO_BITRATE_KBPS};
use crate::downloader::models::DownloadOutcome;
use crate::downloader::traits::{DownloadEngine, ProgressObserver};
use crate::downloader::utils::{find_binary, run_output_with_timeout};

const DEFAULT_TIMEOUT_SECS: u64 = 3600;

pub struct YtDlpEngine {
    binary: String,
    timeout_secs: u64,
}

impl YtDlpEngine {
    pub fn new() -> Self {
        let binary = find_binary("yt-dlp")
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| "yt-dlp".to_string());
        Self {
            binary,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    fn build_args(url: &str, config: &EngineConfig) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            config.format_selector.clone(),
            "-o".to_string(),
            config.output_template.clone(),
            "--newline".to_string(),
            "--no-warnings".to_string(),
            "--ignore-errors".to_string(),
        ];

        if let Some(after) = &config.date_after {
            args.push("--dateafter".to_string());
            args.push(after.clone());
        }
        if let Some(before) = &config.date_before {
            args.push("--datebefore".to_string());
            args.push(before.clone());
        }
        if let Some(max) = config.max_items {
            args.push("--playlist-end".to_string());
            args.push(max.to_string());
        }
        if let Some(bytes) = config.max_filesize_bytes {
            args.push("--max-filesize".to_string());
            args.push(bytes.to_string());
        }

        if let Some(expression) = config.accept.as_ref().and_then(match_filter_expression) {
            args.push("--match-filter".to_string());
            args.push(expression);
        }

        if !config.subtitle_languages.is_empty() {
            args.push("--write-subs".to_string());
            if config.write_auto_subs {
                args.push("--write-auto-subs".to_string());
            }
            args.push("--sub-langs".to_string());
            args.push(config.subtitle_languages.join(","));
        }

        if let Some(archive) = &config.skip_archive_path {
            args.push("--download-archive".to_string());
            args.push(archive.to_string_lossy().into_owned());
        }

        if config.extract_audio {
            args.push("-x".to_string());
            args.push("--audio-format".to_string());
            args.push("mp3".to_string());
            args.push("--audio-quality".to_string());
            args.push(format!("{}K", AUDIO_BITRATE_KBPS));
        }

        if config.write_info_json {
            args.push("--write-info-json".to_string());
        }
        if config.write_thumbnail {
            args.push("--write-thumbnail".to_string());
        }
        if config.geo_bypass {
            args.push("--geo-bypass".to_string());
        }
        if !config.check_certificate {
            args.push("--no-check-certificate".to_string());
        }

        args.push(url.to_string());
        args
    }
}

impl Default for YtDlpEngine {
    fn default() -> Self {
        Self::new()
    }
}

// Numeric metadata bounds become a yt-dlp --match-filter expression so the
// tool skips items before downloading them. Title and orientation checks
// stay local; they need metadata the expression language handles poorly.
fn match_filter_expression(
    accept: &crate::downloader::filters::AcceptFilter,
) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(min) = accept.min_duration {
        parts.push(format!("duration >= {}", min));
    }
    if let Some(max) = accept.max_duration {
        parts.push(format!("duration <= {}", max));
    }
    if let Some(min) = accept.min_views {
        parts.push(format!("view_count >= {}", min));
    }
    if let Some(max) = accept.max_views {
        parts.push(format!("view_count <= {}", max));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" & "))
    }
}

#[async_trait]
impl DownloadEngine for YtDlpEngine {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn is_available(&self) -> bool {
        run_output_with_timeout(&self.binary, vec!["--version".to_string()], 10)
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    async fn download(
        &self,
        url: &str,
        config: &EngineConfig,
        observer: &dyn ProgressObserver,
    ) -> Result<DownloadOutcome, EngineError> {
        let args = Self::build_args(url, config);
        debug!(engine = self.name(), %url, "running {} {}", self.binary, args.join(" "));

        let output = run_output_with_timeout(&self.binary, args, self.timeout_secs)
            .await
            .map_err(EngineError::from)?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(EngineError::from(stderr.to_string()));
        }

        let mut outcome = DownloadOutcome::succeeded("Download finished");
        for line in stdout.lines() {
            observer.on_log(line);
            if let Some(path) = line.split("Destination: ").nth(1) {
                outcome.files.push(path.trim().into());
            }
            // "[youtube] dQw4w9WgXcQ: Downloading webpage"
            if let Some(rest) = line.strip_prefix('[') {
                if let Some((_, after)) = rest.split_once("] ") {
                    if let Some((id, action)) = after.split_once(": ") {
                        if action.starts_with("Downloading") && !id.contains(' ') {
                            let id = id.to_string();
                            if !outcome.item_ids.contains(&id) {
                                outcome.item_ids.push(id);
                            }
                        }
                    }
                }
            }
        }
        for line in stderr.lines() {
            if line.contains("WARNING") {
                outcome.warnings.push(line.to_string());
            }
        }

        outcome.files.dedup();
        info!(
            engine = self.name(),
            files = outcome.files.len(),
            items = outcome.item_ids.len(),
            "download complete"
        );
        Ok(outcome)
    }
}
