//! Seams between the engine and its collaborators
//!
//! The engine reads client rates and writes merged records through these
//! traits so that neither depends on how configuration or files are stored.

use crate::error::AppError;
use crate::models::{CallRecord, ClientRateConfig};

/// Read-only lookup of client rate configurations
pub trait RateConfigSource: Send + Sync {
    /// Find the configuration for a client (exact identifier match)
    fn rate_config(&self, client: &str) -> Option<&ClientRateConfig>;

    /// Number of configured clients
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Destination for a finished merge run
pub trait RecordSink {
    /// Write every record, returning the number written
    fn write_records(&mut self, records: &[CallRecord]) -> Result<usize, AppError>;
}
