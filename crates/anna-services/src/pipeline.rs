//! Per-client reconciliation pipeline
//!
//! Read both exports, merge them, classify every call, charge the calls the
//! console did not already price, and hand the result to a sink.

use anna_core::config::ClientEntry;
use anna_core::models::{CallRecord, PrimaryRow, SecondaryRow, DEFAULT_CARRIER};
use anna_core::traits::{RateConfigSource, RecordSink};
use anna_core::AppResult;
use anna_io::{read_primary, read_secondary};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, instrument, warn};

use crate::charge::ChargeCalculator;
use crate::classifier::classify;
use crate::merger::{MergeStats, Merger};

/// Outcome of one client run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub client: String,
    pub records: usize,
    /// Sum of every exported charge
    pub charged_total: Decimal,
    /// Records priced by the console `discount` field
    pub precharged: usize,
    pub categories: BTreeMap<String, usize>,
    /// Which charge rule priced each computed record
    pub rules: BTreeMap<&'static str, usize>,
    pub merge: MergeStats,
}

/// Merge, classify and charge one client's rows in memory
pub fn reconcile(
    client: &str,
    primary: &[PrimaryRow],
    secondary: &[SecondaryRow],
    calculator: &ChargeCalculator,
) -> AppResult<(Vec<CallRecord>, RunSummary)> {
    let carrier = calculator
        .book()
        .rate_config(client)
        .map(|c| c.carrier.clone())
        .unwrap_or_else(|| DEFAULT_CARRIER.to_string());

    if calculator.book().rate_config(client).is_none() {
        warn!(client = %client, "No rate configuration, default rate applies");
    }

    let mut merger = Merger::new(client, carrier);
    merger.ingest_primary(primary)?;
    merger.ingest_secondary(secondary)?;
    let (mut records, merge) = merger.finish();

    let mut summary = RunSummary {
        client: client.to_string(),
        records: records.len(),
        merge,
        ..Default::default()
    };

    for record in &mut records {
        let category = classify(&record.call_to, &record.call_type, &record.call_from);
        *summary.categories.entry(category.clone()).or_default() += 1;
        record.number_type = Some(category);

        match &record.call_charge {
            Some(precharged) => {
                summary.precharged += 1;
                match Decimal::from_str(precharged) {
                    Ok(amount) => summary.charged_total += amount,
                    Err(_) => warn!(
                        sequence_id = %record.sequence_id,
                        value = %precharged,
                        "Console charge is not a number, left out of the total"
                    ),
                }
            }
            None => {
                let outcome = calculator.compute(record);
                *summary.rules.entry(outcome.rule).or_default() += 1;
                summary.charged_total += outcome.charge.amount();
                record.call_charge = Some(outcome.charge.to_string());
            }
        }
    }

    summary.charged_total = summary.charged_total.normalize();
    Ok((records, summary))
}

/// Run one configured client end to end
#[instrument(skip(entry, calculator, sink), fields(client = %entry.rates.client))]
pub fn run_client<S: RecordSink + ?Sized>(
    entry: &ClientEntry,
    calculator: &ChargeCalculator,
    sink: &mut S,
) -> AppResult<RunSummary> {
    let client = entry.rates.client.as_str();
    info!("Processing client {}", client);

    let primary = read_primary(Path::new(&entry.dashboard))?;
    let secondary = read_secondary(Path::new(&entry.console))?;

    let (records, summary) = reconcile(client, &primary, &secondary, calculator)?;
    sink.write_records(&records)?;

    info!(
        records = summary.records,
        charged_total = %summary.charged_total,
        "Client {} done",
        client
    );
    Ok(summary)
}
