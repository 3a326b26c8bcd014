// Date expression resolver
//
// Turns free-form date phrases ("last week", "2024-12-01", "last 5 days")
// into calendar dates. Pure: the reference "now" is always passed in, which
// keeps every caller testable against a fixed date.

use lazy_static::lazy_static;
use regex::Regex;
use time::macros::format_description;
use time::{Date, Duration};

lazy_static! {
    static ref LAST_N_DAYS: Regex = Regex::new(r"last (\d+) days?").expect("static regex");
}

/// Resolve a date expression against a reference date.
///
/// Relative phrases recognized case-insensitively: `today`, `yesterday`,
/// `this week`/`last 7 days`, `this month`/`last 30 days`, `last week`
/// (14 days back), `last month` (60 days back), `last N days`. Absolute
/// fallbacks are tried in order: `YYYY-MM-DD`, `MM/DD/YYYY`, `DD/MM/YYYY`,
/// `YYYYMMDD`.
///
/// `last week`/`last month` deliberately reach back two periods (14/60 days)
/// rather than one; this mirrors the established behavior and is pending
/// product clarification.
///
/// Returns `None` when nothing matches; the caller decides whether that is
/// fatal.
pub fn resolve(expression: &str, today: Date) -> Option<Date> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return None;
    }

    let lower = trimmed.to_lowercase();
    match lower.as_str() {
        "today" => return Some(today),
        "yesterday" => return today.checked_sub(Duration::days(1)),
        "this week" | "last 7 days" => return today.checked_sub(Duration::days(7)),
        "this month" | "last 30 days" => return today.checked_sub(Duration::days(30)),
        "last week" => return today.checked_sub(Duration::days(14)),
        "last month" => return today.checked_sub(Duration::days(60)),
        _ => {}
    }

    if let Some(caps) = LAST_N_DAYS.captures(&lower) {
        if let Ok(days) = caps[1].parse::<i64>() {
            return today.checked_sub(Duration::days(days));
        }
    }

    let formats = [
        format_description!("[year]-[month]-[day]"),
        format_description!("[month]/[day]/[year]"),
        format_description!("[day]/[month]/[year]"),
        format_description!("[year][month][day]"),
    ];
    for format in formats {
        if let Ok(date) = Date::parse(trimmed, format) {
            return Some(date);
        }
    }

    None
}

/// Engine-native compact form (`YYYYMMDD`).
pub fn compact(date: Date) -> String {
    format!(
        "{:04}{:02}{:02}",
        date.year(),
        date.month() as u8,
        date.day()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const TODAY: Date = date!(2025 - 01 - 15);

    #[test]
    fn resolves_relative_phrases() {
        assert_eq!(resolve("today", TODAY), Some(TODAY));
        assert_eq!(resolve("Yesterday", TODAY), Some(date!(2025 - 01 - 14)));
        assert_eq!(resolve("this week", TODAY), Some(date!(2025 - 01 - 08)));
        assert_eq!(resolve("last 7 days", TODAY), Some(date!(2025 - 01 - 08)));
        assert_eq!(resolve("this month", TODAY), Some(date!(2024 - 12 - 16)));
        assert_eq!(resolve("last 5 days", TODAY), Some(date!(2025 - 01 - 10)));
        assert_eq!(resolve("last 1 day", TODAY), Some(date!(2025 - 01 - 14)));
    }

    #[test]
    fn last_week_reaches_back_two_periods() {
        // Established behavior: 14 days, not 7.
        assert_eq!(resolve("last week", TODAY), Some(date!(2025 - 01 - 01)));
        assert_eq!(resolve("last month", TODAY), Some(date!(2024 - 11 - 16)));
    }

    #[test]
    fn resolves_absolute_formats() {
        assert_eq!(resolve("2024-12-01", TODAY), Some(date!(2024 - 12 - 01)));
        assert_eq!(resolve("12/01/2024", TODAY), Some(date!(2024 - 12 - 01)));
        // Month slot overflows, so this only parses as DD/MM.
        assert_eq!(resolve("25/12/2024", TODAY), Some(date!(2024 - 12 - 25)));
        assert_eq!(resolve("20241201", TODAY), Some(date!(2024 - 12 - 01)));
    }

    #[test]
    fn absolute_dates_ignore_reference() {
        let other_day = date!(1999 - 06 - 30);
        assert_eq!(resolve("2024-12-01", other_day), Some(date!(2024 - 12 - 01)));
    }

    #[test]
    fn unparseable_input_is_none() {
        assert_eq!(resolve("", TODAY), None);
        assert_eq!(resolve("   ", TODAY), None);
        assert_eq!(resolve("next thursday", TODAY), None);
        assert_eq!(resolve("2024-13-40", TODAY), None);
    }

    #[test]
    fn compact_is_engine_native() {
        assert_eq!(compact(date!(2024 - 12 - 01)), "20241201");
        assert_eq!(compact(date!(2025 - 01 - 05)), "20250105");
    }
}
