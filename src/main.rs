//! Anna Billing batch runner
//!
//! Reconciles every configured client's dashboard and console exports into a
//! billed CSV. Clients run in parallel, one blocking worker per client.

use anna_core::AppConfig;
use anna_io::CsvOutputWriter;
use anna_services::{run_client, BillingPolicy, ChargeCalculator, RateBook};
use anyhow::Context;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "anna_billing={},anna_services={},anna_io={},anna_core={}",
            log_level, log_level, log_level, log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting Anna Billing v{}", env!("CARGO_PKG_VERSION"));

    // An explicit config file on the command line replaces the layered lookup
    let config = match env::args().nth(1) {
        Some(path) => AppConfig::from_file(&path),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;

    if config.clients.is_empty() {
        warn!("No clients configured, nothing to do");
        return Ok(());
    }

    let calculator = Arc::new(ChargeCalculator::new(
        RateBook::new(config.rate_configs()),
        BillingPolicy::from(&config.billing),
    ));

    let workers = config.run.max_workers.max(1);
    let semaphore = Arc::new(Semaphore::new(workers));
    let aborted = Arc::new(AtomicBool::new(false));

    info!(
        "Processing {} clients with {} workers",
        config.clients.len(),
        workers
    );

    let mut handles = Vec::with_capacity(config.clients.len());
    for entry in config.clients.iter().cloned() {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .context("Worker pool closed")?;

        if aborted.load(Ordering::SeqCst) {
            warn!("Run aborted, not starting client {}", entry.rates.client);
            break;
        }

        let calculator = calculator.clone();
        let aborted = aborted.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let mut sink = CsvOutputWriter::new(&entry.output);
            let result = run_client(&entry, &calculator, &mut sink);
            if let Err(e) = &result {
                if e.is_fatal_for_run() {
                    aborted.store(true, Ordering::SeqCst);
                }
            }
            (entry.rates.client, result)
        }));
    }

    let total = config.clients.len();
    let mut failures = total - handles.len();

    for handle in handles {
        match handle.await {
            Ok((client, Ok(summary))) => {
                let details = serde_json::to_string(&summary).unwrap_or_default();
                info!(client = %client, summary = %details, "Client reconciled");
            }
            Ok((client, Err(e))) => {
                error!(client = %client, code = e.error_code(), "Client failed: {}", e);
                failures += 1;
            }
            Err(e) => {
                error!("Client worker panicked: {}", e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} clients failed", failures, total);
    }

    info!("All {} clients reconciled", total);
    Ok(())
}
