//! Phone and time normalization
//!
//! Turns the text cells of both exports into canonical phone identifiers,
//! absolute timestamps and durations so the two sources can be compared.

use anna_core::models::{PhoneId, Timestamp, ToPhoneId};
use anna_core::{AppError, AppResult};
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use tracing::warn;

use crate::constants::{SOURCE_OFFSET_SECS, SUPPORTED_REGION};

/// Timestamp layout of the console export (UTC wall clock)
const SOURCE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Layouts accepted for dashboard timestamps without an offset
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Layouts accepted for dashboard timestamps with an offset
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"];

/// Console call-type codes renamed at ingest
const CALL_TYPE_MAPPING: &[(&str, &str)] = &[
    ("OUTGOING_CALL", "Outbound call"),
    ("OUTGOING_CALL_ABSENCE", "Outbound call (No answer)"),
];

/// Fixed offset every timestamp is expressed in
pub fn source_offset() -> FixedOffset {
    FixedOffset::east_opt(SOURCE_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Canonicalize a phone value
///
/// Idempotent: an already canonical [`PhoneId`] comes back unchanged.
pub fn normalize_phone<P: ToPhoneId + ?Sized>(raw: &P) -> PhoneId {
    raw.to_phone_id()
}

/// True for cells meaning "no value yet"
pub fn is_null_sentinel(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed == "-" || trimmed.eq_ignore_ascii_case("nan")
}

/// Convert a console timestamp for a PBX region
///
/// The value is read as UTC wall-clock and re-expressed at the fixed +07:00
/// offset. Only the `jkt` region exists.
pub fn convert_source_time(raw: &str, region: &str) -> AppResult<Timestamp> {
    if region.trim() != SUPPORTED_REGION {
        return Err(AppError::UnsupportedRegion(region.to_string()));
    }

    let naive = NaiveDateTime::parse_from_str(raw.trim(), SOURCE_TIME_FORMAT)
        .map_err(|_| AppError::TimestampParse(raw.to_string()))?;

    Ok(Utc.from_utc_datetime(&naive).with_timezone(&source_offset()))
}

/// Like [`convert_source_time`], but null sentinels map to `None`
pub fn convert_optional_source_time(raw: &str, region: &str) -> AppResult<Option<Timestamp>> {
    if is_null_sentinel(raw) {
        return Ok(None);
    }
    convert_source_time(raw, region).map(Some)
}

/// Parse a dashboard timestamp
///
/// Values carrying an offset are converted to the source offset; naive
/// values are already local wall-clock time.
pub fn parse_primary_time(raw: &str) -> AppResult<Timestamp> {
    let trimmed = raw.trim();
    let offset = source_offset();

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&offset));
    }

    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(trimmed, format) {
            return Ok(ts.with_timezone(&offset));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            if let Some(ts) = offset.from_local_datetime(&naive).single() {
                return Ok(ts);
            }
        }
    }

    Err(AppError::TimestampParse(raw.to_string()))
}

/// Like [`parse_primary_time`], but null sentinels map to `None`
pub fn parse_optional_primary_time(raw: &str) -> AppResult<Option<Timestamp>> {
    if is_null_sentinel(raw) {
        return Ok(None);
    }
    parse_primary_time(raw).map(Some)
}

/// Parse a strict `hh:mm:ss` duration
pub fn parse_duration(raw: &str) -> AppResult<Duration> {
    let err = || AppError::DurationParse(raw.to_string());

    let fields: Vec<&str> = raw.trim().split(':').collect();
    let [hours, minutes, seconds] = fields.as_slice() else {
        return Err(err());
    };

    let parse = |field: &str| -> AppResult<i64> {
        if field.is_empty() || !field.chars().all(|c| c.is_ascii_digit()) {
            return Err(err());
        }
        field.parse::<i64>().map_err(|_| err())
    };

    let (hours, minutes, seconds) = (parse(*hours)?, parse(*minutes)?, parse(*seconds)?);
    let total = hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes.checked_mul(60)?))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(err)?;

    Duration::try_seconds(total).ok_or_else(err)
}

/// Parse a duration, logging and returning zero when malformed
pub fn parse_duration_or_zero(raw: &str, field: &str, sequence_id: &str) -> Duration {
    match parse_duration(raw) {
        Ok(d) => d,
        Err(e) => {
            warn!(
                sequence_id = %sequence_id,
                field = %field,
                value = %raw,
                "{}; treating as zero",
                e
            );
            Duration::zero()
        }
    }
}

/// Rename console call-type codes to dashboard labels
pub fn map_console_call_type(code: &str) -> String {
    CALL_TYPE_MAPPING
        .iter()
        .find(|(from, _)| *from == code)
        .map(|(_, to)| to.to_string())
        .unwrap_or_else(|| code.to_string())
}
