//! Log normalization: level inference, timestamp conversion, ordering
//!
//! Converts provider-specific log records (Loki stream values with
//! nanosecond timestamps) into canonical [`LogEntry`] values.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::model::incident::{LogEntry, LogLevel};
use crate::model::loki::LokiStream;

/// Infer a log level from a message line plus an optional label hint.
///
/// Exact substring match over the case-folded concatenation: "error"/"err"
/// → ERROR, else "warn" → WARN, else INFO. No word boundaries, so e.g.
/// "terrain" matches "err". This deliberately over-matches; callers wanting
/// stricter semantics must classify upstream.
pub fn infer_level(line: &str, label_hint: Option<&str>) -> LogLevel {
    let mut combined = line.to_lowercase();
    if let Some(hint) = label_hint {
        combined.push_str(&hint.to_lowercase());
    }

    if combined.contains("error") || combined.contains("err") {
        LogLevel::Error
    } else if combined.contains("warn") {
        LogLevel::Warn
    } else {
        LogLevel::Info
    }
}

/// Convert a nanoseconds-since-epoch decimal string to milliseconds,
/// flooring toward negative infinity.
pub fn ns_to_millis(ns: &str) -> Option<i64> {
    ns.trim().parse::<i64>().ok().map(|n| n.div_euclid(1_000_000))
}

/// Render epoch milliseconds as ISO-8601 UTC with millisecond precision
/// (`2023-10-27T10:00:01.000Z`).
pub fn millis_to_iso(ms: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Flatten all `[timestamp_ns, line]` pairs from the given streams into
/// normalized entries, sorted ascending by timestamp. Loki returns streams
/// newest-first; the output contract is chronological.
///
/// Pairs with unparseable timestamps are skipped rather than failing the
/// whole batch.
pub fn entries_from_streams(streams: &[LokiStream]) -> Vec<LogEntry> {
    let mut keyed: Vec<(i64, LogEntry)> = Vec::new();

    for stream in streams {
        let hint = stream.stream.get("level").map(String::as_str);
        for (ts_ns, line) in &stream.values {
            let Some(ms) = ns_to_millis(ts_ns) else {
                tracing::debug!(ts = %ts_ns, "Skipping log entry with unparseable timestamp");
                continue;
            };
            let Some(timestamp) = millis_to_iso(ms) else {
                tracing::debug!(ts = %ts_ns, "Skipping log entry outside representable time range");
                continue;
            };
            keyed.push((
                ms,
                LogEntry {
                    timestamp,
                    level: infer_level(line, hint),
                    message: line.clone(),
                },
            ));
        }
    }

    keyed.sort_by_key(|(ms, _)| *ms);
    keyed.into_iter().map(|(_, entry)| entry).collect()
}
