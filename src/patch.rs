//! Picking the newest game patch out of `/constants/patch`.

use crate::error::*;
use crate::data_structs::{PatchEntry, PatchInfo};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use log::debug;

/// Integer ids arrive either as numbers or as numeric strings.
fn patch_id(entry: &PatchEntry) -> Option<i64> {
    match entry.id.as_ref()? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None
    }
}

/// Unix timestamp of a patch date: RFC 3339 (fractional seconds allowed),
/// `YYYY-MM-DD HH:MM:SS` taken as UTC, or a bare integer.
pub fn parse_timestamp(raw: &str) -> Result<i64> {
    let raw = raw.trim();

    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse::<i64>().chain_err(|| format!("timestamp '{}' out of range", raw));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.timestamp());
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .chain_err(|| format!("unrecognised patch date '{}'", raw))?;
    Ok(naive.and_utc().timestamp())
}

fn raw_date(entry: &PatchEntry) -> String {
    match &entry.date {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new()
    }
}

/// The entry with the highest id. Entries without a usable id are ignored;
/// a missing date resolves to timestamp 0.
pub fn latest_patch(entries: &[PatchEntry]) -> Result<Option<PatchInfo>> {
    let latest = entries.iter()
                        .filter_map(|e| patch_id(e).map(|id| (id, e)))
                        .max_by_key(|(id, _)| *id);

    let (id, entry) = match latest {
        Some(latest) => latest,
        None => return Ok(None)
    };

    let raw_date = raw_date(entry);
    let timestamp = if raw_date.is_empty() { 0 } else { parse_timestamp(&raw_date)? };
    let date_str = match Utc.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => String::new()
    };

    debug!("latest patch {} (id {}) at {}", entry.name, id, timestamp);

    Ok(Some(PatchInfo {
        id,
        name: entry.name.clone(),
        raw_date,
        timestamp,
        date_str
    }))
}
