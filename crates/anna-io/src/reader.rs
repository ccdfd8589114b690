//! Source file readers
//!
//! Each export is read fully into memory. A missing required column is fatal
//! for that file; extra columns are ignored.

use anna_core::models::{PrimaryRow, SecondaryRow};
use anna_core::{AppError, AppResult};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, instrument};

/// Read a dashboard export
#[instrument]
pub fn read_primary(path: &Path) -> AppResult<Vec<PrimaryRow>> {
    let data = read_to_string(path)?;
    let rows = parse_rows(&path.display().to_string(), &data, PrimaryRow::REQUIRED_COLUMNS)?;
    info!("Read {} dashboard rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Read a console export
#[instrument]
pub fn read_secondary(path: &Path) -> AppResult<Vec<SecondaryRow>> {
    let data = read_to_string(path)?;
    let rows = parse_rows(&path.display().to_string(), &data, SecondaryRow::REQUIRED_COLUMNS)?;
    info!("Read {} console rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn read_to_string(path: &Path) -> AppResult<String> {
    fs::read_to_string(path).map_err(|e| {
        error!("Failed to read {}: {}", path.display(), e);
        AppError::Io(format!("{}: {}", path.display(), e))
    })
}

/// Parse CSV text into rows after checking the header row
pub fn parse_rows<T: DeserializeOwned>(
    file: &str,
    csv_data: &str,
    required: &[&str],
) -> AppResult<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    check_columns(file, &headers, required)?;

    let mut rows = Vec::new();
    for (line, record) in reader.deserialize::<T>().enumerate() {
        let row = record.map_err(|e| {
            error!("{}: row {} could not be read: {}", file, line + 1, e);
            AppError::Csv(format!("{} row {}: {}", file, line + 1, e))
        })?;
        rows.push(row);
    }

    debug!("{}: parsed {} rows", file, rows.len());
    Ok(rows)
}

/// Fail with the first required column missing from the header row
pub fn check_columns(file: &str, headers: &[String], required: &[&str]) -> AppResult<()> {
    for column in required {
        if !headers.iter().any(|h| h == column) {
            error!("{}: missing required column '{}'", file, column);
            return Err(AppError::MissingColumn {
                file: file.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DASHBOARD: &str = "\
Sequence ID,User name,Call from,Call to,Call type,Dial begin time,Call begin time,Call end time,Ringing time,Call duration,Call memo
1001,alice,+62 21 5091 3400,0812-3456-7890,Outbound call,2024-03-01 17:00:00,2024-03-01 17:00:05,2024-03-01 17:02:35,00:00:05,00:02:30,
";

    #[test]
    fn test_parse_primary_rows() {
        let rows: Vec<PrimaryRow> =
            parse_rows("dashboard.csv", DASHBOARD, PrimaryRow::REQUIRED_COLUMNS).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sequence_id, "1001");
        assert_eq!(rows[0].call_to, "0812-3456-7890");
        assert_eq!(rows[0].call_memo, "");
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let data = "used_number,number,call_type\n1,2,OUTGOING_CALL\n";
        let err = parse_rows::<SecondaryRow>("console.csv", data, SecondaryRow::REQUIRED_COLUMNS)
            .unwrap_err();
        match err {
            AppError::MissingColumn { file, column } => {
                assert_eq!(file, "console.csv");
                assert_eq!(column, "call_id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extra_columns_ignored() {
        let data = "\
used_number,number,call_type,call_id,dial_starts_at,dial_answered_at,dial_ends_at,pbx_region,all_duration_of_call_sec_str,duration_of_call_sec_str,discount,extra
2150913400,81234567890,OUTGOING_CALL,c-1,2024-03-01 10:00:00,nan,nan,jkt,00:00:10,00:00:00,0,x
";
        let rows: Vec<SecondaryRow> =
            parse_rows("console.csv", data, SecondaryRow::REQUIRED_COLUMNS).unwrap();
        assert_eq!(rows[0].call_id, "c-1");
        assert_eq!(rows[0].dial_answered_at, "nan");
    }
}
