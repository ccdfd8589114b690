//! Raw rows from the two call exports
//!
//! Cells are kept as text exactly as exported; the normalizer turns them into
//! a [`super::CallRecord`].

use serde::Deserialize;

/// Dashboard (primary source) row
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrimaryRow {
    #[serde(rename = "Sequence ID")]
    pub sequence_id: String,
    #[serde(rename = "User name")]
    pub user_name: String,
    #[serde(rename = "Call from")]
    pub call_from: String,
    #[serde(rename = "Call to")]
    pub call_to: String,
    #[serde(rename = "Call type")]
    pub call_type: String,
    #[serde(rename = "Dial begin time")]
    pub dial_begin_time: String,
    #[serde(rename = "Call begin time")]
    pub call_begin_time: String,
    #[serde(rename = "Call end time")]
    pub call_end_time: String,
    #[serde(rename = "Ringing time")]
    pub ringing_time: String,
    #[serde(rename = "Call duration")]
    pub call_duration: String,
    #[serde(rename = "Call memo")]
    pub call_memo: String,
}

impl PrimaryRow {
    /// Columns that must be present in a dashboard export
    pub const REQUIRED_COLUMNS: &'static [&'static str] = &[
        "Sequence ID",
        "User name",
        "Call from",
        "Call to",
        "Call type",
        "Dial begin time",
        "Call begin time",
        "Call end time",
        "Ringing time",
        "Call duration",
        "Call memo",
    ];
}

/// Console/PBX (secondary source) row
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecondaryRow {
    pub used_number: String,
    pub number: String,
    pub call_type: String,
    pub call_id: String,
    pub dial_starts_at: String,
    pub dial_answered_at: String,
    pub dial_ends_at: String,
    pub pbx_region: String,
    pub all_duration_of_call_sec_str: String,
    pub duration_of_call_sec_str: String,
    pub discount: String,
}

impl SecondaryRow {
    /// Columns that must be present in a console export
    pub const REQUIRED_COLUMNS: &'static [&'static str] = &[
        "used_number",
        "number",
        "call_type",
        "call_id",
        "dial_starts_at",
        "dial_answered_at",
        "dial_ends_at",
        "pbx_region",
        "all_duration_of_call_sec_str",
        "duration_of_call_sec_str",
        "discount",
    ];
}
