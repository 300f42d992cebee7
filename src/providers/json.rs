//! Helpers shared by the shape adapters for reading untrusted explorer JSON

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::models::errors::{AppError, AppResult};

/// Required field by JSON pointer ("/chain_stats/funded_txo_sum")
pub fn require<'a>(value: &'a Value, pointer: &str) -> AppResult<&'a Value> {
    value
        .pointer(pointer)
        .filter(|v| !v.is_null())
        .ok_or_else(|| AppError::missing_field(pointer.trim_start_matches('/')))
}

/// String field, or "-" for display when absent
pub fn display_str(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "-".to_string(),
    }
}

/// Integer that may arrive as a number or numeric string
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub fn as_u64(value: &Value) -> Option<u64> {
    as_i64(value).and_then(|v| u64::try_from(v).ok())
}

pub fn from_unix_secs(secs: i64) -> Option<DateTime<Utc>> {
    if secs <= 0 {
        return None;
    }
    Utc.timestamp_opt(secs, 0).single()
}

pub fn from_unix_millis(millis: i64) -> Option<DateTime<Utc>> {
    if millis <= 0 {
        return None;
    }
    Utc.timestamp_millis_opt(millis).single()
}

/// RFC 3339 or "YYYY-MM-DD HH:MM:SS" (assumed UTC)
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Hedera "seconds.nanoseconds" consensus timestamp
pub fn parse_consensus_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let (secs, nanos) = raw.split_once('.').unwrap_or((raw, "0"));
    let secs: i64 = secs.parse().ok()?;
    let fraction = nanos.get(..9.min(nanos.len()))?;
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // "5" is half a second, not five nanoseconds
    let nanos: u32 = format!("{:0<9}", fraction).parse().ok()?;
    if secs <= 0 {
        return None;
    }
    Utc.timestamp_opt(secs, nanos).single()
}

/// Oldest of the given timestamps
pub fn oldest<I>(timestamps: I) -> Option<DateTime<Utc>>
where
    I: IntoIterator<Item = Option<DateTime<Utc>>>,
{
    timestamps.into_iter().flatten().min()
}
