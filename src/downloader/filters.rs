// Filter compiler
//
// Combines a validated filter, the detected site capability and an output
// root into the concrete engine configuration. Compilation never fails:
// an unparseable sub-field (bad date, bad size string) is dropped so that
// degraded filtering still beats blocking the download.

use std::path::{Path, PathBuf};

use time::Date;

use super::dates;
use super::models::{DownloadFilter, MediaProbe, SizeLimit, MAX_DOWNLOADS_CAP};
use super::sites::SiteCapability;

/// Target bitrate for audio extraction, in kbps.
pub const AUDIO_BITRATE_KBPS: u32 = 192;

/// English subtitle variants requested when subtitles are enabled.
pub const SUBTITLE_LANGUAGES: &[&str] = &["en", "en-US"];

const ARCHIVE_FILE_NAME: &str = ".download_archive.txt";

/// Compiled, engine-ready configuration. Built fresh per download call and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Engine-native quality/codec selection expression
    pub format_selector: String,
    /// Output path pattern with creator/title/id/extension placeholders
    pub output_template: String,
    /// Per-item inclusion check; `None` means accept everything
    pub accept: Option<AcceptFilter>,
    /// Compact (`YYYYMMDD`) bounds, present only when the site supports them
    pub date_after: Option<String>,
    pub date_before: Option<String>,
    pub max_items: Option<u32>,
    pub max_filesize_bytes: Option<u64>,
    /// Empty when subtitles were not requested
    pub subtitle_languages: Vec<String>,
    pub write_auto_subs: bool,
    pub skip_archive_path: Option<PathBuf>,
    /// Extract best-audio and transcode to mp3 at [`AUDIO_BITRATE_KBPS`]
    pub extract_audio: bool,
    pub write_info_json: bool,
    pub write_thumbnail: bool,
    pub geo_bypass: bool,
    pub check_certificate: bool,
}

/// Pure per-item accept/reject check evaluated against cheap metadata.
/// `evaluate` returns `None` to accept or a human-readable reject reason.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptFilter {
    pub min_duration: Option<u32>,
    pub max_duration: Option<u32>,
    pub include_titles: Vec<String>,
    pub exclude_titles: Vec<String>,
    pub min_views: Option<u64>,
    pub max_views: Option<u64>,
    /// Short-form structural check: URL path markers pass outright,
    /// otherwise only items taller than they are wide are kept
    pub vertical_only: bool,
}

impl AcceptFilter {
    fn is_active(&self) -> bool {
        self.min_duration.is_some()
            || self.max_duration.is_some()
            || !self.include_titles.is_empty()
            || !self.exclude_titles.is_empty()
            || self.min_views.is_some()
            || self.max_views.is_some()
            || self.vertical_only
    }

    pub fn evaluate(&self, probe: &MediaProbe) -> Option<String> {
        let duration = probe.duration_seconds.unwrap_or(0);
        if let Some(min) = self.min_duration {
            if duration < min {
                return Some(format!(
                    "Duration {}s is less than minimum {}s",
                    duration, min
                ));
            }
        }
        if let Some(max) = self.max_duration {
            if duration > max {
                return Some(format!("Duration {}s exceeds maximum {}s", duration, max));
            }
        }

        let title = probe.title.to_lowercase();
        for pattern in &self.exclude_titles {
            if title.contains(&pattern.to_lowercase()) {
                return Some(format!("Title contains excluded pattern: {}", pattern));
            }
        }
        if !self.include_titles.is_empty()
            && !self
                .include_titles
                .iter()
                .any(|pattern| title.contains(&pattern.to_lowercase()))
        {
            return Some("Title does not match any required patterns".to_string());
        }

        let views = probe.view_count.unwrap_or(0);
        if let Some(min) = self.min_views {
            if views < min {
                return Some(format!("View count {} is less than minimum {}", views, min));
            }
        }
        if let Some(max) = self.max_views {
            if views > max {
                return Some(format!("View count {} exceeds maximum {}", views, max));
            }
        }

        if self.vertical_only && !is_vertical(probe) {
            return Some("Not a Short/Reel (horizontal format)".to_string());
        }

        None
    }
}

// URL path markers are the strong signal; the aspect-ratio check catches
// short-form items served under a standard watch URL.
fn is_vertical(probe: &MediaProbe) -> bool {
    if probe.webpage_url.contains("/shorts/")
        || probe.original_url.contains("/shorts/")
        || probe.webpage_url.contains("/reel/")
    {
        return true;
    }
    match (probe.width, probe.height) {
        (Some(width), Some(height)) => height > width,
        _ => false,
    }
}

/// Compile a validated filter against the detected site capability.
pub fn compile(
    filter: &DownloadFilter,
    site: &SiteCapability,
    output_root: &Path,
    today: Date,
) -> EngineConfig {
    let audio_only =
        filter.content_type.contains("Audio Only") || filter.quality.contains("Audio Only");
    let short_form = filter.content_type.contains("Shorts Only")
        || filter.content_type.contains("Reels Only");

    let format_selector = if audio_only {
        "bestaudio/best".to_string()
    } else if short_form {
        "bestvideo[height>width]+bestaudio/best[height>width]/best".to_string()
    } else {
        quality_selector(&filter.quality).to_string()
    };

    // Date bounds only mean something where the site can filter by date.
    let (date_after, date_before) = if site.supports_date_filter {
        (
            filter
                .date_from
                .as_deref()
                .and_then(|expr| dates::resolve(expr, today))
                .map(dates::compact),
            filter
                .date_to
                .as_deref()
                .and_then(|expr| dates::resolve(expr, today))
                .map(dates::compact),
        )
    } else {
        (None, None)
    };

    let accept = AcceptFilter {
        min_duration: filter.min_duration,
        max_duration: filter.max_duration,
        include_titles: filter.include_titles.clone(),
        exclude_titles: filter.exclude_titles.clone(),
        min_views: filter.min_views,
        max_views: filter.max_views,
        vertical_only: short_form,
    };

    let output_template = output_root
        .join(site.display_name)
        .join("%(uploader)s")
        .join("%(title)s_%(id)s.%(ext)s")
        .to_string_lossy()
        .into_owned();

    EngineConfig {
        format_selector,
        output_template,
        accept: accept.is_active().then_some(accept),
        date_after,
        date_before,
        // Clamped here again independently of the validator.
        max_items: filter.max_downloads.map(|max| max.min(MAX_DOWNLOADS_CAP)),
        max_filesize_bytes: filter.max_filesize.as_ref().and_then(parse_size),
        subtitle_languages: if filter.download_subtitles {
            SUBTITLE_LANGUAGES.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        },
        write_auto_subs: filter.download_subtitles,
        skip_archive_path: filter
            .skip_existing
            .then(|| output_root.join(ARCHIVE_FILE_NAME)),
        extract_audio: audio_only,
        write_info_json: true,
        write_thumbnail: true,
        geo_bypass: true,
        check_certificate: false,
    }
}

// Named tiers cap vertical resolution; anything unknown means unconstrained.
fn quality_selector(quality: &str) -> &'static str {
    match quality {
        "4K" => "bestvideo[height<=2160]+bestaudio/best[height<=2160]",
        "1440p" => "bestvideo[height<=1440]+bestaudio/best[height<=1440]",
        "1080p" => "bestvideo[height<=1080]+bestaudio/best[height<=1080]",
        "720p" => "bestvideo[height<=720]+bestaudio/best[height<=720]",
        "480p" => "bestvideo[height<=480]+bestaudio/best[height<=480]",
        _ => "bestvideo+bestaudio/best",
    }
}

// "2G" / "500M" / raw byte counts. Anything else is dropped.
fn parse_size(limit: &SizeLimit) -> Option<u64> {
    match limit {
        SizeLimit::Bytes(bytes) => Some(*bytes),
        SizeLimit::Spec(spec) => {
            let spec = spec.trim().to_uppercase();
            if let Some(value) = spec.strip_suffix('G') {
                value
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .map(|n| (n * 1024.0 * 1024.0 * 1024.0) as u64)
            } else if let Some(value) = spec.strip_suffix('M') {
                value
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .map(|n| (n * 1024.0 * 1024.0) as u64)
            } else {
                spec.parse::<u64>().ok()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::sites;
    use time::macros::date;

    const TODAY: Date = date!(2025 - 01 - 15);

    fn youtube() -> &'static SiteCapability {
        sites::detect("https://www.youtube.com/watch?v=abc")
    }

    fn root() -> PathBuf {
        PathBuf::from("/tmp/archive")
    }

    fn vertical_probe() -> MediaProbe {
        MediaProbe {
            width: Some(1080),
            height: Some(1920),
            ..MediaProbe::default()
        }
    }

    #[test]
    fn audio_only_targets_audio_extraction() {
        let filter = DownloadFilter {
            content_type: "Audio Only".to_string(),
            ..DownloadFilter::default()
        };
        let config = compile(&filter, youtube(), &root(), TODAY);
        assert_eq!(config.format_selector, "bestaudio/best");
        assert!(config.extract_audio);
        // No dimension-based rejection may survive audio-only compilation.
        if let Some(accept) = &config.accept {
            assert!(!accept.vertical_only);
            assert!(accept.evaluate(&MediaProbe::default()).is_none());
        }
    }

    #[test]
    fn shorts_scenario_compiles_vertical_bias() {
        let filter = DownloadFilter {
            content_type: "Shorts Only".to_string(),
            max_downloads: Some(10),
            ..DownloadFilter::default()
        };
        let site = sites::detect("https://www.youtube.com/@SomeChannel/shorts");
        assert_eq!(site.key, "youtube");

        let config = compile(&filter, site, &root(), TODAY);
        assert!(config.format_selector.contains("height>width"));
        assert_eq!(config.max_items, Some(10));

        let accept = config.accept.expect("shorts filter must be active");
        let by_path = MediaProbe {
            webpage_url: "https://youtube.com/shorts/abc".to_string(),
            ..MediaProbe::default()
        };
        assert!(accept.evaluate(&by_path).is_none());
        assert!(accept.evaluate(&vertical_probe()).is_none());

        let horizontal = MediaProbe {
            width: Some(1920),
            height: Some(1080),
            ..MediaProbe::default()
        };
        assert!(accept.evaluate(&horizontal).is_some());
    }

    #[test]
    fn reel_path_marker_passes_structural_check() {
        let filter = DownloadFilter {
            content_type: "Reels Only".to_string(),
            ..DownloadFilter::default()
        };
        let site = sites::detect("https://www.instagram.com/someone/reels/");
        let config = compile(&filter, site, &root(), TODAY);
        let accept = config.accept.expect("reels filter must be active");

        let reel = MediaProbe {
            webpage_url: "https://instagram.com/reel/xyz/".to_string(),
            ..MediaProbe::default()
        };
        assert!(accept.evaluate(&reel).is_none());
    }

    #[test]
    fn quality_tiers_cap_resolution() {
        for (label, cap) in [
            ("4K", 2160),
            ("1440p", 1440),
            ("1080p", 1080),
            ("720p", 720),
            ("480p", 480),
        ] {
            let filter = DownloadFilter {
                quality: label.to_string(),
                ..DownloadFilter::default()
            };
            let config = compile(&filter, youtube(), &root(), TODAY);
            assert!(
                config.format_selector.contains(&format!("height<={}", cap)),
                "{} selector wrong: {}",
                label,
                config.format_selector
            );
        }
    }

    #[test]
    fn unknown_quality_falls_back_to_best() {
        let filter = DownloadFilter {
            quality: "Cinema Mode".to_string(),
            ..DownloadFilter::default()
        };
        let config = compile(&filter, youtube(), &root(), TODAY);
        assert_eq!(config.format_selector, "bestvideo+bestaudio/best");
    }

    #[test]
    fn date_bounds_become_compact_dates() {
        let filter = DownloadFilter {
            date_from: Some("last week".to_string()),
            date_to: Some("today".to_string()),
            ..DownloadFilter::default()
        };
        let config = compile(&filter, youtube(), &root(), TODAY);
        assert_eq!(config.date_after.as_deref(), Some("20250101"));
        assert_eq!(config.date_before.as_deref(), Some("20250115"));
    }

    #[test]
    fn dates_are_dropped_for_sites_without_date_support() {
        let filter = DownloadFilter {
            date_from: Some("2024-12-01".to_string()),
            ..DownloadFilter::default()
        };
        let config = compile(&filter, sites::generic(), &root(), TODAY);
        assert_eq!(config.date_after, None);
    }

    #[test]
    fn bad_sub_fields_are_dropped_not_fatal() {
        let filter = DownloadFilter {
            date_from: Some("whenever".to_string()),
            max_filesize: Some(SizeLimit::Spec("huge".to_string())),
            ..DownloadFilter::default()
        };
        let config = compile(&filter, youtube(), &root(), TODAY);
        assert_eq!(config.date_after, None);
        assert_eq!(config.max_filesize_bytes, None);
    }

    #[test]
    fn size_limits_convert_to_bytes() {
        let cases = [
            (SizeLimit::Bytes(1234), Some(1234)),
            (SizeLimit::Spec("500M".to_string()), Some(524_288_000)),
            (SizeLimit::Spec("2G".to_string()), Some(2_147_483_648)),
            (SizeLimit::Spec("1048576".to_string()), Some(1_048_576)),
        ];
        for (limit, expected) in cases {
            assert_eq!(parse_size(&limit), expected);
        }
    }

    #[test]
    fn count_clamp_is_applied_even_without_validation() {
        let filter = DownloadFilter {
            max_downloads: Some(9999),
            ..DownloadFilter::default()
        };
        let config = compile(&filter, youtube(), &root(), TODAY);
        assert_eq!(config.max_items, Some(MAX_DOWNLOADS_CAP));
    }

    #[test]
    fn no_constraints_means_no_accept_filter() {
        let config = compile(&DownloadFilter::default(), youtube(), &root(), TODAY);
        assert!(config.accept.is_none());
    }

    #[test]
    fn exclude_wins_over_include() {
        let accept = AcceptFilter {
            include_titles: vec!["rust".to_string()],
            exclude_titles: vec!["stream".to_string()],
            ..AcceptFilter::default()
        };
        let probe = MediaProbe {
            title: "Rust livestream highlights".to_string(),
            ..MediaProbe::default()
        };
        assert!(accept.evaluate(&probe).is_some());
    }

    #[test]
    fn duration_and_view_bounds_reject_with_reasons() {
        let accept = AcceptFilter {
            min_duration: Some(60),
            max_duration: Some(600),
            min_views: Some(1000),
            ..AcceptFilter::default()
        };
        let short = MediaProbe {
            duration_seconds: Some(10),
            ..MediaProbe::default()
        };
        assert!(accept.evaluate(&short).unwrap().contains("less than minimum"));

        let long = MediaProbe {
            duration_seconds: Some(1200),
            view_count: Some(5000),
            ..MediaProbe::default()
        };
        assert!(accept.evaluate(&long).unwrap().contains("exceeds maximum"));

        let unpopular = MediaProbe {
            duration_seconds: Some(120),
            view_count: Some(10),
            ..MediaProbe::default()
        };
        assert!(accept.evaluate(&unpopular).is_some());

        let fine = MediaProbe {
            duration_seconds: Some(120),
            view_count: Some(5000),
            ..MediaProbe::default()
        };
        assert!(accept.evaluate(&fine).is_none());
    }

    #[test]
    fn subtitles_and_archive_are_opt_in() {
        let bare = compile(
            &DownloadFilter {
                skip_existing: false,
                ..DownloadFilter::default()
            },
            youtube(),
            &root(),
            TODAY,
        );
        assert!(bare.subtitle_languages.is_empty());
        assert!(bare.skip_archive_path.is_none());

        let full = compile(
            &DownloadFilter {
                download_subtitles: true,
                skip_existing: true,
                ..DownloadFilter::default()
            },
            youtube(),
            &root(),
            TODAY,
        );
        assert_eq!(full.subtitle_languages, vec!["en", "en-US"]);
        assert!(full.write_auto_subs);
        assert_eq!(
            full.skip_archive_path,
            Some(root().join(ARCHIVE_FILE_NAME))
        );
    }
}
