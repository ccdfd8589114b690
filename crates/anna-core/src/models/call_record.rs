//! Call record model
//!
//! One phone call, built from a dashboard or console row and enriched by the
//! merger and the charge calculator.

use chrono::{DateTime, Duration, FixedOffset};
use std::fmt;

use super::phone::PhoneId;

/// Absolute timestamp tagged with the source's fixed offset
pub type Timestamp = DateTime<FixedOffset>;

/// Placeholder for empty memo, user name and timestamp cells
pub const PLACEHOLDER: &str = "-";

/// Output format for timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Identity of a physical call across both sources
///
/// Equality and hashing on the timestamp use the absolute instant, so two
/// renderings of the same moment in different offsets still match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeKey {
    pub call_from: PhoneId,
    pub call_to: PhoneId,
    pub dial_start_at: Timestamp,
}

impl MergeKey {
    pub fn new(call_from: PhoneId, call_to: PhoneId, dial_start_at: Timestamp) -> Self {
        Self {
            call_from,
            call_to,
            dial_start_at,
        }
    }
}

impl fmt::Display for MergeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.call_from,
            self.call_to,
            self.dial_start_at.format("%Y-%m-%dT%H:%M:%S%:z")
        )
    }
}

/// Call Detail Record after normalization
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    /// Client this record is billed to
    pub client: String,

    /// Source-provided call id
    pub sequence_id: String,

    pub user_name: String,

    /// Originating number (canonical)
    pub call_from: PhoneId,

    /// Destination number (canonical)
    pub call_to: PhoneId,

    /// Free-text call type label
    pub call_type: String,

    pub dial_start_at: Timestamp,

    /// None until answered
    pub dial_answered_at: Option<Timestamp>,

    /// None until ended
    pub dial_end_at: Option<Timestamp>,

    pub ringing_time: Duration,

    pub call_duration: Duration,

    pub call_memo: String,

    /// Carrier tag of the client
    pub carrier: String,

    /// Destination classification, filled in before charging
    pub number_type: Option<String>,

    /// Charge as exported; set by the console `discount` field or the calculator
    pub call_charge: Option<String>,
}

impl CallRecord {
    /// Merge key for this record
    pub fn merge_key(&self) -> MergeKey {
        MergeKey::new(
            self.call_from.clone(),
            self.call_to.clone(),
            self.dial_start_at,
        )
    }

    /// Check if the call was answered
    #[inline]
    pub fn was_answered(&self) -> bool {
        self.dial_answered_at.is_some()
    }

    /// Whole seconds of talk time
    #[inline]
    pub fn duration_seconds(&self) -> i64 {
        self.call_duration.num_seconds()
    }

    /// User name as exported
    pub fn display_user_name(&self) -> &str {
        if self.user_name.is_empty() {
            PLACEHOLDER
        } else {
            &self.user_name
        }
    }
}

/// Normalize a memo cell (empty or `nan` becomes the placeholder)
pub fn normalize_memo(memo: &str) -> String {
    if memo.is_empty() || memo == "nan" {
        PLACEHOLDER.to_string()
    } else {
        memo.to_string()
    }
}

/// Format an optional timestamp for export
pub fn format_timestamp(ts: Option<&Timestamp>) -> String {
    ts.map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Format a duration as `H:MM:SS`
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jakarta() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    #[test]
    fn test_merge_key_matches_across_offsets() {
        let local = jakarta().with_ymd_and_hms(2024, 3, 1, 17, 0, 0).unwrap();
        let utc = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, 10, 0, 0)
            .unwrap();

        let a = MergeKey::new(PhoneId::Number(811), PhoneId::Number(2150), local);
        let b = MergeKey::new(PhoneId::Number(811), PhoneId::Number(2150), utc);
        assert_eq!(a, b);
    }

    #[test]
    fn test_merge_key_display() {
        let ts = jakarta().with_ymd_and_hms(2024, 3, 1, 17, 0, 5).unwrap();
        let key = MergeKey::new(PhoneId::Number(811), PhoneId::Symbol("scancall".into()), ts);
        assert_eq!(key.to_string(), "811_scancall_2024-03-01T17:00:05+07:00");
    }

    #[test]
    fn test_normalize_memo() {
        assert_eq!(normalize_memo(""), "-");
        assert_eq!(normalize_memo("nan"), "-");
        assert_eq!(normalize_memo("callback"), "callback");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::seconds(150)), "0:02:30");
        assert_eq!(format_duration(Duration::seconds(3725)), "1:02:05");
        assert_eq!(format_duration(Duration::zero()), "0:00:00");
    }

    #[test]
    fn test_format_timestamp() {
        let ts = jakarta().with_ymd_and_hms(2024, 3, 1, 17, 0, 5).unwrap();
        assert_eq!(format_timestamp(Some(&ts)), "2024-03-01 17:00:05");
        assert_eq!(format_timestamp(None), "-");
    }
}
