//! Defensive decoding of the completion provider's output
//!
//! The provider is instructed to return one JSON object with `answer`
//! and `chartData` keys, but real responses arrive wrapped in markdown
//! fences, doubly encoded inside the `answer` string, or as plain
//! prose. The recovery ladder tries each case in order and never
//! fails: the raw text itself is always a displayable answer.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::types::{ChartData, ChartType};

/// Answer plus optional chart, before orchestrator finalization
#[derive(Debug, Clone)]
pub struct ParsedAnswer {
    pub answer: String,
    pub chart_data: Option<ChartData>,
}

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?is)```(?:json)?[\s\r\n]*(.*?)[\s\r\n]*```").expect("valid fence pattern")
    })
}

/// Multi-tier parser for raw completion text
pub struct ResponseParser;

impl ResponseParser {
    pub fn new() -> Self {
        Self
    }

    /// Decode raw completion text; infallible by contract.
    ///
    /// Ladder: strip markdown fence, parse as `{answer, chartData}`,
    /// recover a nested escaped JSON object from the answer string,
    /// retry a direct parse, and finally fall back to the raw text.
    pub fn parse(&self, raw: &str) -> ParsedAnswer {
        let mut candidate = raw.trim().to_string();

        let inner = fence_pattern()
            .captures(&candidate)
            .map(|captures| captures[1].trim().to_string());
        if let Some(inner) = inner {
            candidate = inner;
            debug!("extracted JSON from markdown block");
        }

        match parse_payload(&candidate) {
            Some(parsed) => self.recover_nested(parsed),
            None => {
                warn!("JSON parsing failed, attempting fallback parsing");

                if candidate.starts_with('{') {
                    if let Some(parsed) = parse_payload(&candidate) {
                        info!("parsed response on second attempt");
                        return parsed;
                    }
                }

                warn!("all parsing attempts failed, using raw response");
                ParsedAnswer {
                    answer: raw.to_string(),
                    chart_data: None,
                }
            }
        }
    }

    /// The model sometimes nests the entire JSON object, with literal
    /// escaped quotes and newlines, inside the `answer` string. Detect
    /// that shape, unescape, and parse the inner object.
    fn recover_nested(&self, parsed: ParsedAnswer) -> ParsedAnswer {
        if parsed.chart_data.is_some() {
            return parsed;
        }

        let trimmed = parsed.answer.trim_start();
        if !trimmed.starts_with('{') {
            return parsed;
        }

        let preview: String = trimmed.chars().take(100).collect();
        warn!(
            %preview,
            "chartData is null but answer starts with '{{', attempting nested parse"
        );

        let unescaped = unescape(trimmed);
        match parse_payload(&unescaped) {
            Some(nested) if nested.chart_data.is_some() => {
                info!("extracted nested JSON from answer string");
                nested
            }
            _ => {
                warn!("nested parse did not yield chart data");
                parsed
            }
        }
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one `{answer, chartData}` object. Field names are matched
/// case-insensitively. Returns `None` for anything that is not a JSON
/// object or carries a malformed chart payload.
fn parse_payload(text: &str) -> Option<ParsedAnswer> {
    let value: Value = serde_json::from_str(text).ok()?;
    let object = value.as_object()?;

    let answer = match get_ci(object, "answer") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(_) => return None,
    };

    let chart_data = match get_ci(object, "chartData") {
        Some(Value::Object(chart)) => {
            let chart = parse_chart(chart)?;
            if chart.is_consistent() {
                Some(chart)
            } else {
                // Mismatched labels/values: keep the answer, drop the chart
                warn!(
                    labels = chart.labels.len(),
                    values = chart.values.len(),
                    "discarding chart with mismatched labels and values"
                );
                None
            }
        }
        Some(Value::Null) | None => None,
        Some(_) => return None,
    };

    Some(ParsedAnswer { answer, chart_data })
}

fn parse_chart(chart: &Map<String, Value>) -> Option<ChartData> {
    let chart_type = match get_ci(chart, "chartType") {
        Some(Value::String(s)) => ChartType::parse_lenient(s),
        _ => ChartType::Bar,
    };

    let title = match get_ci(chart, "title") {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    };

    let labels = match get_ci(chart, "labels") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(|s| s.to_string()))
            .collect::<Option<Vec<String>>>()?,
        _ => Vec::new(),
    };

    let values = match get_ci(chart, "values") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| match v {
                Value::Null => Some(None),
                Value::Number(n) => Some(n.as_f64()),
                _ => None,
            })
            .collect::<Option<Vec<Option<f64>>>>()?,
        _ => Vec::new(),
    };

    Some(ChartData {
        chart_type,
        title,
        labels,
        values,
    })
}

/// Case-insensitive field lookup
fn get_ci<'a>(object: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    object
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// Generic backslash-escape decoder, the moral equivalent of
/// `Regex.Unescape`: turns literal `\n`, `\"`, `\uXXXX` sequences into
/// the characters they denote. Unknown escapes pass through unchanged.
fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('u') => {
                let code: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&code, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&code);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}
