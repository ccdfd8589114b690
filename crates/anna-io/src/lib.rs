//! CSV input/output for Anna Billing
//!
//! Reads the dashboard and console exports into raw rows and writes the
//! merged record set back out. Column presence is the only schema check.

pub mod reader;
pub mod writer;

pub use reader::{read_primary, read_secondary};
pub use writer::{round_up_duration, write_csv, CsvOutputWriter, OutputRow};
