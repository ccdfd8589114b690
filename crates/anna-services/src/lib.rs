//! Reconciliation and charging services for Anna Billing
//!
//! This crate holds the logic that turns a client's two call exports into
//! one billed record set:
//! - `normalizer` - phone, timestamp and duration canonicalization
//! - `classifier` - destination category cascade over static prefix tables
//! - `merger` - two-phase ingest keyed by (origin, destination, start time)
//! - `charge` - ordered charge rule table and the `ChargeCalculator`
//! - `pipeline` - read, merge, classify, charge and write for one client
//!
//! Every client run is independent; the calculator is immutable after
//! construction and can be shared across workers behind an `Arc`.

pub mod charge;
pub mod classifier;
pub mod international_rates;
pub mod merger;
pub mod normalizer;
pub mod pipeline;
pub mod tables;

pub use charge::{BillingPolicy, ChargeCalculator, ChargeOutcome, RateBook, CHARGE_RULES};
pub use classifier::classify;
pub use merger::{MergeStats, MergedStore, Merger};
pub use normalizer::{convert_source_time, normalize_phone, parse_duration};
pub use pipeline::{reconcile, run_client, RunSummary};

/// Engine constants
pub mod constants {
    /// The only PBX region with a known offset
    pub const SUPPORTED_REGION: &str = "jkt";

    /// Offset of the supported region (UTC+07:00), in seconds
    pub const SOURCE_OFFSET_SECS: i32 = 7 * 3600;

    /// User name given to calls only seen in the console export
    pub const UNKNOWN_USER: &str = "-";
}
