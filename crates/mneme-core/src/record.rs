use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, PrimitiveDateTime};

/// One queued memory (one JSONL line in the memory queue).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    pub content: String,
    pub metadata: serde_json::Value,
    pub timestamp: String,
}

impl MemoryRecord {
    /// Build a record stamped with the current UTC time.
    pub fn now(content: impl Into<String>, metadata: serde_json::Value) -> Self {
        Self {
            content: content.into(),
            metadata,
            timestamp: now_rfc3339(),
        }
    }
}

/// Current UTC time as RFC 3339. UTC always renders with a trailing `Z`.
pub fn now_rfc3339() -> String {
    format_rfc3339(OffsetDateTime::now_utc())
}

pub fn format_rfc3339(ts: OffsetDateTime) -> String {
    ts.to_offset(time::UtcOffset::UTC)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Parse a queued timestamp.
///
/// Accepts RFC 3339, and offset-less ISO 8601 (`2025-01-31T09:15:02.123456`)
/// as written by older queue producers, which is read as UTC.
pub fn parse_timestamp(ts: &str) -> Option<OffsetDateTime> {
    let ts = ts.trim();
    if let Ok(parsed) = OffsetDateTime::parse(ts, &Rfc3339) {
        return Some(parsed);
    }
    let naive = time::format_description::parse(
        "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]",
    )
    .ok()?;
    PrimitiveDateTime::parse(ts, &naive)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}
