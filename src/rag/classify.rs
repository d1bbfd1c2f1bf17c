//! Heuristic query classification: standard vs. forecasting mode
//!
//! Forecasting questions are detected by keyword, and deliberately get
//! no date filter: extrapolation needs the historical data a filter for
//! the asked-about future period would exclude. Standard questions get
//! a half-open UTC date filter when the text names a year (and
//! optionally a month).

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Keywords that mark a question as predictive/forecasting.
/// Any single case-insensitive substring hit is sufficient.
static PREDICTIVE_KEYWORDS: &[&str] = &[
    "predict",
    "forecast",
    "future",
    "estimate",
    "projection",
    "expected",
    "anticipated",
    "trend",
    "will be",
    "going to be",
    "next year",
    "next month",
    "next quarter",
    "2010",
    "2011",
    "2012",
    "based on",
    "historical",
    "past years",
];

/// Month lexicon, scanned in order: full name before abbreviation,
/// January through December. The first substring hit wins, so e.g.
/// "may" can match inside an unrelated word. Known quirk, kept as-is.
static MONTH_NAMES: &[(&str, u32)] = &[
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sep", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

fn year_pattern() -> &'static Regex {
    static YEAR: OnceLock<Regex> = OnceLock::new();
    YEAR.get_or_init(|| Regex::new(r"\b(20\d{2})\b").expect("valid year pattern"))
}

/// Half-open UTC date range `[start, end)` for the search collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFilter {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateFilter {
    /// Render as the textual predicate the search service expects:
    /// `dateKey ge <start> and dateKey lt <end>`
    pub fn expression(&self) -> String {
        format!(
            "dateKey ge {} and dateKey lt {}",
            self.start.format("%Y-%m-%dT%H:%M:%SZ"),
            self.end.format("%Y-%m-%dT%H:%M:%SZ"),
        )
    }
}

/// Result of classifying one question; derived per request, not persisted
#[derive(Debug, Clone)]
pub struct QueryClassification {
    pub is_predictive: bool,
    pub date_filter: Option<DateFilter>,
}

/// Classify a question into standard or forecasting mode.
///
/// The date filter is computed only for standard questions.
pub fn classify(question: &str) -> QueryClassification {
    let is_predictive = is_predictive_query(question);

    let date_filter = if is_predictive {
        debug!("predictive query detected, skipping date filter");
        None
    } else {
        extract_date_filter(question)
    };

    QueryClassification {
        is_predictive,
        date_filter,
    }
}

fn is_predictive_query(question: &str) -> bool {
    let lower = question.to_lowercase();
    PREDICTIVE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Extract `[first of month, first of next month)` when the question
/// names a month and a year, `[Jan 1, Jan 1 of next year)` when it
/// names only a year, and nothing otherwise.
fn extract_date_filter(question: &str) -> Option<DateFilter> {
    let year: i32 = year_pattern()
        .find(question)?
        .as_str()
        .parse()
        .ok()?;

    let lower = question.to_lowercase();
    let month = MONTH_NAMES
        .iter()
        .find(|(name, _)| lower.contains(*name))
        .map(|&(_, number)| number);

    let (start, end) = match month {
        Some(month) => {
            let start = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()?;
            let end = if month == 12 {
                Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0).single()?
            } else {
                Utc.with_ymd_and_hms(year, month + 1, 1, 0, 0, 0).single()?
            };
            (start, end)
        }
        None => {
            let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
            let end = Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0).single()?;
            (start, end)
        }
    };

    debug!(year, ?month, "extracted date filter from question");
    Some(DateFilter { start, end })
}
