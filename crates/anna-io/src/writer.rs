//! Merged output writer

use anna_core::models::call_record::{format_duration, format_timestamp};
use anna_core::models::{CallRecord, PLACEHOLDER};
use anna_core::traits::RecordSink;
use anna_core::{AppError, AppResult};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One row of the merged output file
#[derive(Debug, Clone, Serialize)]
pub struct OutputRow {
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
    #[serde(rename = "Number type")]
    pub number_type: String,
    #[serde(rename = "Dial starts at")]
    pub dial_starts_at: String,
    #[serde(rename = "Dial answered at")]
    pub dial_answered_at: String,
    #[serde(rename = "Dial ends at")]
    pub dial_ends_at: String,
    #[serde(rename = "Ringing time")]
    pub ringing_time: String,
    #[serde(rename = "Call duration")]
    pub call_duration: String,
    #[serde(rename = "Call memo")]
    pub call_memo: String,
    #[serde(rename = "Call charge")]
    pub call_charge: String,
    #[serde(rename = "Round up duration")]
    pub round_up_duration: i64,
}

impl From<&CallRecord> for OutputRow {
    fn from(record: &CallRecord) -> Self {
        let call_duration = format_duration(record.call_duration);
        let round_up_duration = round_up_duration(&call_duration);

        Self {
            sequence_id: record.sequence_id.clone(),
            user_name: record.display_user_name().to_string(),
            call_from: record.call_from.to_string(),
            call_to: record.call_to.to_string(),
            call_type: record.call_type.clone(),
            number_type: record
                .number_type
                .clone()
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            dial_starts_at: format_timestamp(Some(&record.dial_start_at)),
            dial_answered_at: format_timestamp(record.dial_answered_at.as_ref()),
            dial_ends_at: format_timestamp(record.dial_end_at.as_ref()),
            ringing_time: format_duration(record.ringing_time),
            call_duration,
            call_memo: record.call_memo.clone(),
            call_charge: record
                .call_charge
                .clone()
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            round_up_duration,
        }
    }
}

/// Minutes billed for a formatted duration
///
/// `h:mm:ss` gives `h*60 + m + ceil(s/60)`; a bare integer is read as seconds.
/// Anything else is logged and counts as zero.
pub fn round_up_duration(call_duration: &str) -> i64 {
    match parse_round_up(call_duration) {
        Some(minutes) => minutes,
        None => {
            warn!("Error parsing call duration: {}", call_duration);
            0
        }
    }
}

fn parse_round_up(value: &str) -> Option<i64> {
    if value.contains(':') {
        let parts: Vec<i64> = value
            .split(':')
            .map(|p| p.trim().parse::<i64>().ok())
            .collect::<Option<Vec<_>>>()?;
        match parts.as_slice() {
            [h, m, s] => Some(h * 60 + m + (s + 59) / 60),
            _ => None,
        }
    } else {
        let seconds = value.trim().parse::<i64>().ok()?;
        Some((seconds + 59) / 60)
    }
}

/// Serialize records as CSV into any writer
pub fn write_csv<W: Write>(writer: W, records: &[CallRecord]) -> AppResult<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(OutputRow::from(record))?;
    }
    csv_writer.flush()?;
    Ok(records.len())
}

/// Writes the merged record set to a CSV file
pub struct CsvOutputWriter {
    path: PathBuf,
}

impl CsvOutputWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvOutputWriter {
    fn write_records(&mut self, records: &[CallRecord]) -> Result<usize, AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = fs::File::create(&self.path)?;
        let written = write_csv(file, records)?;
        info!("Saved {} merged records to {}", written, self.path.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anna_core::models::PhoneId;
    use chrono::{Duration, FixedOffset, TimeZone};

    fn record(sequence_id: &str, answered: bool) -> CallRecord {
        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        let start = offset.with_ymd_and_hms(2024, 3, 1, 17, 0, 0).unwrap();
        CallRecord {
            client: "acme".to_string(),
            sequence_id: sequence_id.to_string(),
            user_name: String::new(),
            call_from: PhoneId::Number(2150913400),
            call_to: PhoneId::Number(81234567890),
            call_type: "Outbound call".to_string(),
            dial_start_at: start,
            dial_answered_at: answered.then(|| start + Duration::seconds(5)),
            dial_end_at: None,
            ringing_time: Duration::seconds(5),
            call_duration: Duration::seconds(150),
            call_memo: PLACEHOLDER.to_string(),
            carrier: "Atlasat".to_string(),
            number_type: Some("Mobile - Telkomsel".to_string()),
            call_charge: Some("2160".to_string()),
        }
    }

    #[test]
    fn test_round_up_duration_clock_format() {
        assert_eq!(round_up_duration("0:02:30"), 3);
        assert_eq!(round_up_duration("0:02:00"), 2);
        assert_eq!(round_up_duration("1:00:01"), 61);
        assert_eq!(round_up_duration("0:00:00"), 0);
    }

    #[test]
    fn test_round_up_duration_seconds() {
        assert_eq!(round_up_duration("61"), 2);
        assert_eq!(round_up_duration("60"), 1);
    }

    #[test]
    fn test_round_up_duration_garbage() {
        assert_eq!(round_up_duration("abc"), 0);
        assert_eq!(round_up_duration("1:2"), 0);
    }

    #[test]
    fn test_csv_output_writer_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/merged.csv");
        let mut writer = CsvOutputWriter::new(&path);

        let written = writer
            .write_records(&[record("1", true), record("2", false)])
            .unwrap();
        assert_eq!(written, 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(
            headers,
            vec![
                "Sequence ID",
                "User name",
                "Call from",
                "Call to",
                "Call type",
                "Number type",
                "Dial starts at",
                "Dial answered at",
                "Dial ends at",
                "Ringing time",
                "Call duration",
                "Call memo",
                "Call charge",
                "Round up duration",
            ]
        );

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);

        let first = &rows[0];
        assert_eq!(&first[0], "1");
        assert_eq!(&first[1], "-");
        assert_eq!(&first[2], "2150913400");
        assert_eq!(&first[5], "Mobile - Telkomsel");
        assert_eq!(&first[6], "2024-03-01 17:00:00");
        assert_eq!(&first[7], "2024-03-01 17:00:05");
        assert_eq!(&first[8], "-");
        assert_eq!(&first[9], "0:00:05");
        assert_eq!(&first[10], "0:02:30");
        assert_eq!(&first[11], "-");
        assert_eq!(&first[12], "2160");
        assert_eq!(&first[13], "3");

        assert_eq!(&rows[1][7], "-");
    }

    #[test]
    fn test_write_csv_unset_fields_use_placeholder() {
        let mut unpriced = record("9", false);
        unpriced.number_type = None;
        unpriced.call_charge = None;

        let mut buffer = Vec::new();
        assert_eq!(write_csv(&mut buffer, &[unpriced]).unwrap(), 1);

        let text = String::from_utf8(buffer).unwrap();
        let line = text.lines().nth(1).unwrap();
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields[5], "-");
        assert_eq!(fields[12], "-");
    }
}
