//! Two-phase merge of dashboard and console exports
//!
//! Phase 1 loads the dashboard; the first row seen for a merge key is
//! authoritative except for user name and memo. Phase 2 applies the console
//! export, which owns call outcome and timing for calls found in both.

use anna_core::models::call_record::normalize_memo;
use anna_core::models::{CallRecord, MergeKey, PrimaryRow, SecondaryRow, PLACEHOLDER};
use anna_core::AppResult;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, info, instrument};

use crate::constants::UNKNOWN_USER;
use crate::normalizer::{
    convert_optional_source_time, convert_source_time, is_null_sentinel, map_console_call_type,
    normalize_phone, parse_duration_or_zero, parse_optional_primary_time, parse_primary_time,
};

/// Records keyed by merge key, kept in first-insertion order
#[derive(Debug, Clone, Default)]
pub struct MergedStore {
    records: Vec<CallRecord>,
    index: HashMap<MergeKey, usize>,
    sequence_ids: HashSet<String>,
}

impl MergedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &MergeKey) -> Option<&CallRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    fn get_mut(&mut self, key: &MergeKey) -> Option<&mut CallRecord> {
        match self.index.get(key) {
            Some(&i) => self.records.get_mut(i),
            None => None,
        }
    }

    /// Whether any stored record carries this sequence id
    pub fn contains_sequence_id(&self, sequence_id: &str) -> bool {
        self.sequence_ids.contains(sequence_id)
    }

    /// Insert a record under its key; returns false if the key is taken
    pub fn insert(&mut self, record: CallRecord) -> bool {
        let key = record.merge_key();
        if self.index.contains_key(&key) {
            return false;
        }
        self.sequence_ids.insert(record.sequence_id.clone());
        self.index.insert(key, self.records.len());
        self.records.push(record);
        true
    }

    pub fn records(&self) -> &[CallRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<CallRecord> {
        self.records
    }
}

/// Counters for one merge run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub primary_rows: usize,
    /// Dashboard rows folded into an earlier row with the same key
    pub primary_duplicates: usize,
    pub secondary_rows: usize,
    /// Console rows that updated a dashboard call
    pub key_matches: usize,
    /// Console rows skipped because their call id was already present
    pub sequence_id_matches: usize,
    /// Console rows added as new calls
    pub secondary_inserts: usize,
}

/// Merges one client's exports into a [`MergedStore`]
#[derive(Debug)]
pub struct Merger {
    client: String,
    carrier: String,
    store: MergedStore,
    stats: MergeStats,
}

impl Merger {
    pub fn new(client: impl Into<String>, carrier: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            carrier: carrier.into(),
            store: MergedStore::new(),
            stats: MergeStats::default(),
        }
    }

    /// Phase 1: load dashboard rows
    #[instrument(skip(self, rows), fields(client = %self.client, rows = rows.len()))]
    pub fn ingest_primary(&mut self, rows: &[PrimaryRow]) -> AppResult<()> {
        for row in rows {
            self.stats.primary_rows += 1;
            let record = self.primary_record(row).map_err(|e| {
                error!(sequence_id = %row.sequence_id, "Dashboard row rejected: {}", e);
                e
            })?;

            let key = record.merge_key();
            match self.store.get_mut(&key) {
                Some(existing) => {
                    debug!(key = %key, "Duplicate dashboard row, refreshing user name and memo");
                    existing.user_name = record.user_name;
                    existing.call_memo = record.call_memo;
                    self.stats.primary_duplicates += 1;
                }
                None => {
                    self.store.insert(record);
                }
            }
        }

        info!(
            "Loaded {} dashboard calls ({} duplicates)",
            self.store.len(),
            self.stats.primary_duplicates
        );
        Ok(())
    }

    /// Phase 2: apply console rows in source order
    ///
    /// An unsupported region or an unreadable start time aborts the run.
    #[instrument(skip(self, rows), fields(client = %self.client, rows = rows.len()))]
    pub fn ingest_secondary(&mut self, rows: &[SecondaryRow]) -> AppResult<()> {
        for row in rows {
            self.stats.secondary_rows += 1;
            self.apply_secondary(row).map_err(|e| {
                error!(call_id = %row.call_id, "Console row rejected: {}", e);
                e
            })?;
        }

        info!(
            "Applied console export: {} matched, {} by call id, {} new",
            self.stats.key_matches, self.stats.sequence_id_matches, self.stats.secondary_inserts
        );
        Ok(())
    }

    fn apply_secondary(&mut self, row: &SecondaryRow) -> AppResult<()> {
        let region = row.pbx_region.as_str();
        let call_from = normalize_phone(row.used_number.as_str());
        let call_to = normalize_phone(row.number.as_str());
        let dial_start_at = convert_source_time(&row.dial_starts_at, region)?;
        let dial_answered_at = convert_optional_source_time(&row.dial_answered_at, region)?;
        let dial_end_at = convert_optional_source_time(&row.dial_ends_at, region)?;

        let call_type = map_console_call_type(row.call_type.trim());
        let ringing_time = parse_duration_or_zero(
            &row.all_duration_of_call_sec_str,
            "all_duration_of_call_sec_str",
            &row.call_id,
        );
        let call_duration = parse_duration_or_zero(
            &row.duration_of_call_sec_str,
            "duration_of_call_sec_str",
            &row.call_id,
        );
        let call_charge = (!is_null_sentinel(&row.discount)).then(|| row.discount.trim().to_string());

        let key = MergeKey::new(call_from, call_to, dial_start_at);

        if let Some(record) = self.store.get_mut(&key) {
            debug!(key = %key, "Console row matched dashboard call");
            record.call_type = call_type;
            record.dial_answered_at = dial_answered_at;
            record.dial_end_at = dial_end_at;
            record.ringing_time = ringing_time;
            record.call_duration = call_duration;
            record.call_memo = PLACEHOLDER.to_string();
            record.call_charge = call_charge;
            self.stats.key_matches += 1;
            return Ok(());
        }

        let sequence_id = row.call_id.trim();
        if self.store.contains_sequence_id(sequence_id) {
            debug!(key = %key, call_id = %sequence_id, "Call id already present, skipping console row");
            self.stats.sequence_id_matches += 1;
            return Ok(());
        }

        debug!(key = %key, "Console-only call");
        self.store.insert(CallRecord {
            client: self.client.clone(),
            sequence_id: sequence_id.to_string(),
            user_name: UNKNOWN_USER.to_string(),
            call_from: key.call_from,
            call_to: key.call_to,
            call_type,
            dial_start_at: key.dial_start_at,
            dial_answered_at,
            dial_end_at,
            ringing_time,
            call_duration,
            call_memo: PLACEHOLDER.to_string(),
            carrier: self.carrier.clone(),
            number_type: None,
            call_charge,
        });
        self.stats.secondary_inserts += 1;
        Ok(())
    }

    fn primary_record(&self, row: &PrimaryRow) -> AppResult<CallRecord> {
        let sequence_id = row.sequence_id.trim();
        let user_name = if is_null_sentinel(&row.user_name) {
            String::new()
        } else {
            row.user_name.trim().to_string()
        };

        Ok(CallRecord {
            client: self.client.clone(),
            sequence_id: sequence_id.to_string(),
            user_name,
            call_from: normalize_phone(row.call_from.as_str()),
            call_to: normalize_phone(row.call_to.as_str()),
            call_type: row.call_type.trim().to_string(),
            dial_start_at: parse_primary_time(&row.dial_begin_time)?,
            dial_answered_at: parse_optional_primary_time(&row.call_begin_time)?,
            dial_end_at: parse_optional_primary_time(&row.call_end_time)?,
            ringing_time: parse_duration_or_zero(&row.ringing_time, "Ringing time", sequence_id),
            call_duration: parse_duration_or_zero(&row.call_duration, "Call duration", sequence_id),
            call_memo: normalize_memo(row.call_memo.trim()),
            carrier: self.carrier.clone(),
            number_type: None,
            call_charge: None,
        })
    }

    pub fn stats(&self) -> MergeStats {
        self.stats
    }

    pub fn store(&self) -> &MergedStore {
        &self.store
    }

    /// Records in first-insertion order plus the run counters
    pub fn finish(self) -> (Vec<CallRecord>, MergeStats) {
        (self.store.into_records(), self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anna_core::models::PhoneId;
    use anna_core::AppError;
    use chrono::Duration;

    fn primary(seq: &str, from: &str, to: &str, start: &str, user: &str, memo: &str) -> PrimaryRow {
        PrimaryRow {
            sequence_id: seq.to_string(),
            user_name: user.to_string(),
            call_from: from.to_string(),
            call_to: to.to_string(),
            call_type: "Outbound call".to_string(),
            dial_begin_time: start.to_string(),
            call_begin_time: "-".to_string(),
            call_end_time: "-".to_string(),
            ringing_time: "00:00:05".to_string(),
            call_duration: "00:02:30".to_string(),
            call_memo: memo.to_string(),
        }
    }

    fn secondary(id: &str, from: &str, to: &str, start: &str, call_type: &str) -> SecondaryRow {
        SecondaryRow {
            used_number: from.to_string(),
            number: to.to_string(),
            call_type: call_type.to_string(),
            call_id: id.to_string(),
            dial_starts_at: start.to_string(),
            dial_answered_at: start.to_string(),
            dial_ends_at: "nan".to_string(),
            pbx_region: "jkt".to_string(),
            all_duration_of_call_sec_str: "00:00:40".to_string(),
            duration_of_call_sec_str: "00:00:30".to_string(),
            discount: "nan".to_string(),
        }
    }

    #[test]
    fn test_duplicate_primary_keeps_first_row() {
        let mut merger = Merger::new("acme", "Atlasat");
        let mut second = primary("2", "+62 21 5091 3400", "081234567890", "2024-03-01 17:00:00", "bob", "");
        second.call_duration = "00:10:00".to_string();

        merger
            .ingest_primary(&[
                primary("1", "2150913400", "81234567890", "2024-03-01 17:00:00", "alice", "first"),
                second,
            ])
            .unwrap();

        let (records, stats) = merger.finish();
        assert_eq!(records.len(), 1);
        assert_eq!(stats.primary_duplicates, 1);
        assert_eq!(records[0].sequence_id, "1");
        assert_eq!(records[0].user_name, "bob");
        assert_eq!(records[0].call_memo, "-");
        assert_eq!(records[0].call_duration, Duration::seconds(150));
    }

    #[test]
    fn test_console_overwrites_matched_call() {
        let mut merger = Merger::new("acme", "Atlasat");
        merger
            .ingest_primary(&[primary("1", "2150913400", "81234567890", "2024-03-01 17:00:00", "alice", "memo")])
            .unwrap();

        let mut row = secondary("99", "622150913400", "81234567890", "2024-03-01 10:00:00", "OUTGOING_CALL");
        row.discount = "0".to_string();
        merger.ingest_secondary(&[row]).unwrap();

        let (records, stats) = merger.finish();
        assert_eq!(stats.key_matches, 1);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.sequence_id, "1");
        assert_eq!(record.user_name, "alice");
        assert_eq!(record.call_type, "Outbound call");
        assert_eq!(record.call_memo, "-");
        assert_eq!(record.call_duration, Duration::seconds(30));
        assert_eq!(record.ringing_time, Duration::seconds(40));
        assert!(record.was_answered());
        assert_eq!(record.dial_end_at, None);
        assert_eq!(record.call_charge.as_deref(), Some("0"));
    }

    #[test]
    fn test_console_only_call_is_inserted() {
        let mut merger = Merger::new("acme", "Indosat");
        merger
            .ingest_primary(&[primary("1", "2150913400", "81234567890", "2024-03-01 17:00:00", "alice", "")])
            .unwrap();
        merger
            .ingest_secondary(&[secondary("77", "2150913400", "81299999999", "2024-03-01 11:00:00", "OUTGOING_CALL")])
            .unwrap();

        let (records, stats) = merger.finish();
        assert_eq!(stats.secondary_inserts, 1);
        assert_eq!(records.len(), 2);

        let inserted = &records[1];
        assert_eq!(inserted.sequence_id, "77");
        assert_eq!(inserted.user_name, "-");
        assert_eq!(inserted.call_type, "Outbound call");
        assert_eq!(inserted.call_to, PhoneId::Number(81299999999));
        assert_eq!(inserted.carrier, "Indosat");
        assert_eq!(inserted.call_charge, None);
    }

    #[test]
    fn test_known_call_id_is_not_inserted_twice() {
        let mut merger = Merger::new("acme", "Atlasat");
        merger
            .ingest_primary(&[primary("1", "2150913400", "81234567890", "2024-03-01 17:00:00", "alice", "")])
            .unwrap();
        // Same call id, but the start time disagrees so the key does not match
        merger
            .ingest_secondary(&[secondary("1", "2150913400", "81234567890", "2024-03-01 10:00:03", "OUTGOING_CALL")])
            .unwrap();

        let (records, stats) = merger.finish();
        assert_eq!(records.len(), 1);
        assert_eq!(stats.sequence_id_matches, 1);
        assert_eq!(records[0].call_type, "Outbound call");
        assert_eq!(records[0].call_duration, Duration::seconds(150));
    }

    #[test]
    fn test_unsupported_region_aborts() {
        let mut merger = Merger::new("acme", "Atlasat");
        let mut row = secondary("1", "2150913400", "81234567890", "2024-03-01 10:00:00", "OUTGOING_CALL");
        row.pbx_region = "sgp".to_string();

        let err = merger.ingest_secondary(&[row]).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedRegion(_)));
        assert!(err.is_fatal_for_run());
    }

    #[test]
    fn test_console_rows_apply_in_order() {
        let mut merger = Merger::new("acme", "Atlasat");
        let first = secondary("5", "2150913400", "81234567890", "2024-03-01 10:00:00", "OUTGOING_CALL_ABSENCE");
        let mut second = secondary("6", "2150913400", "81234567890", "2024-03-01 10:00:00", "OUTGOING_CALL");
        second.duration_of_call_sec_str = "00:01:00".to_string();

        merger.ingest_secondary(&[first, second]).unwrap();

        let (records, stats) = merger.finish();
        assert_eq!(records.len(), 1);
        assert_eq!(stats.secondary_inserts, 1);
        assert_eq!(stats.key_matches, 1);
        assert_eq!(records[0].sequence_id, "5");
        assert_eq!(records[0].call_type, "Outbound call");
        assert_eq!(records[0].call_duration, Duration::seconds(60));
    }
}
