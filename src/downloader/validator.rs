// Filter validator
//
// Sanitizes a raw user-supplied filter before compilation. Never fails:
// every rule adjusts the filter in place and attaches a human-readable
// warning. Validating an already-valid filter is a no-op.

use time::Date;

use super::dates;
use super::models::{DownloadFilter, MAX_DOWNLOADS_CAP};

/// Sanitize `filter`, returning the adjusted copy plus warnings.
///
/// Rules, in warning order:
/// 1. `max_downloads` above the safety cap is clamped.
/// 2. A resolvable but reversed date range is swapped.
/// 3. A reversed duration range is swapped.
pub fn validate(filter: &DownloadFilter, today: Date) -> (DownloadFilter, Vec<String>) {
    let mut validated = filter.clone();
    let mut warnings = Vec::new();

    if let Some(max) = validated.max_downloads {
        if max > MAX_DOWNLOADS_CAP {
            validated.max_downloads = Some(MAX_DOWNLOADS_CAP);
            warnings.push(format!(
                "Download count capped at {} for safety",
                MAX_DOWNLOADS_CAP
            ));
        }
    }

    let from = validated
        .date_from
        .as_deref()
        .and_then(|expr| dates::resolve(expr, today));
    let to = validated
        .date_to
        .as_deref()
        .and_then(|expr| dates::resolve(expr, today));
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            std::mem::swap(&mut validated.date_from, &mut validated.date_to);
            warnings.push(
                "Date range was reversed (from > to), automatically corrected".to_string(),
            );
        }
    }

    if let (Some(min), Some(max)) = (validated.min_duration, validated.max_duration) {
        if min > max {
            validated.min_duration = Some(max);
            validated.max_duration = Some(min);
            warnings.push("Duration range was reversed, automatically corrected".to_string());
        }
    }

    (validated, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const TODAY: Date = date!(2025 - 01 - 15);

    #[test]
    fn caps_excessive_download_counts() {
        let filter = DownloadFilter {
            max_downloads: Some(2000),
            ..DownloadFilter::default()
        };
        let (validated, warnings) = validate(&filter, TODAY);
        assert_eq!(validated.max_downloads, Some(MAX_DOWNLOADS_CAP));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn swaps_reversed_date_range() {
        let filter = DownloadFilter {
            date_from: Some("2025-01-10".to_string()),
            date_to: Some("2024-12-01".to_string()),
            ..DownloadFilter::default()
        };
        let (validated, warnings) = validate(&filter, TODAY);
        assert_eq!(validated.date_from.as_deref(), Some("2024-12-01"));
        assert_eq!(validated.date_to.as_deref(), Some("2025-01-10"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn swaps_reversed_relative_dates() {
        // "today" resolves later than "last week", so the pair is reversed.
        let filter = DownloadFilter {
            date_from: Some("today".to_string()),
            date_to: Some("last week".to_string()),
            ..DownloadFilter::default()
        };
        let (validated, _) = validate(&filter, TODAY);
        assert_eq!(validated.date_from.as_deref(), Some("last week"));
        assert_eq!(validated.date_to.as_deref(), Some("today"));
    }

    #[test]
    fn unresolvable_dates_are_left_alone() {
        let filter = DownloadFilter {
            date_from: Some("whenever".to_string()),
            date_to: Some("2024-12-01".to_string()),
            ..DownloadFilter::default()
        };
        let (validated, warnings) = validate(&filter, TODAY);
        assert_eq!(validated, filter);
        assert!(warnings.is_empty());
    }

    #[test]
    fn swaps_reversed_duration_range() {
        let filter = DownloadFilter {
            min_duration: Some(600),
            max_duration: Some(60),
            ..DownloadFilter::default()
        };
        let (validated, warnings) = validate(&filter, TODAY);
        assert_eq!(validated.min_duration, Some(60));
        assert_eq!(validated.max_duration, Some(600));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn validation_is_idempotent() {
        let filter = DownloadFilter {
            max_downloads: Some(750),
            date_from: Some("2025-01-10".to_string()),
            date_to: Some("2024-12-01".to_string()),
            min_duration: Some(600),
            max_duration: Some(60),
            ..DownloadFilter::default()
        };
        let (first, first_warnings) = validate(&filter, TODAY);
        assert_eq!(first_warnings.len(), 3);

        let (second, second_warnings) = validate(&first, TODAY);
        assert_eq!(second, first);
        assert!(second_warnings.is_empty());
    }

    #[test]
    fn valid_filter_passes_through_unchanged() {
        let filter = DownloadFilter {
            max_downloads: Some(40),
            date_from: Some("last week".to_string()),
            date_to: Some("today".to_string()),
            min_duration: Some(10),
            max_duration: Some(120),
            ..DownloadFilter::default()
        };
        let (validated, warnings) = validate(&filter, TODAY);
        assert_eq!(validated, filter);
        assert!(warnings.is_empty());
    }
}
