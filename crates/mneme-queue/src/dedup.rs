//! Duplicate guard over the recent end of the memory queue.
//!
//! Exact fingerprint match only. Records whose timestamp cannot be read are
//! treated as recent, so an unreadable timestamp can block a re-queue but never
//! let one through.

use mneme_core::{content_fingerprint, parse_timestamp};
use time::{Duration, OffsetDateTime};

use crate::queue::Queue;

/// How many trailing queue lines are compared.
pub const DEDUP_SCAN_LINES: usize = 20;

/// Whether `content` was already queued within the last `window_hours`.
pub fn is_duplicate(queue: &Queue, content: &str, window_hours: u64) -> bool {
    is_duplicate_at(queue, content, window_hours, OffsetDateTime::now_utc())
}

/// [`is_duplicate`] against an explicit clock.
pub fn is_duplicate_at(
    queue: &Queue,
    content: &str,
    window_hours: u64,
    now: OffsetDateTime,
) -> bool {
    let lines = match queue.tail(DEDUP_SCAN_LINES) {
        Ok(lines) => lines,
        Err(e) => {
            tracing::debug!(queue = %queue.path().display(), "dedup scan skipped: {e}");
            return false;
        }
    };
    // None when the window reaches past the representable range: everything is recent.
    let cutoff = i64::try_from(window_hours)
        .ok()
        .and_then(|h| h.checked_mul(3600))
        .and_then(|secs| now.checked_sub(Duration::seconds(secs)));
    let fingerprint = content_fingerprint(content);

    lines.iter().any(|line| {
        let parsed: serde_json::Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!("skipping malformed queue line: {e}");
                return false;
            }
        };
        let in_window = parsed
            .get("timestamp")
            .and_then(|t| t.as_str())
            .and_then(parse_timestamp)
            .is_none_or(|ts| cutoff.is_none_or(|cutoff| ts >= cutoff));
        in_window
            && parsed
                .get("content")
                .and_then(|c| c.as_str())
                .is_some_and(|c| content_fingerprint(c) == fingerprint)
    })
}
