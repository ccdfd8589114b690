//! Domain models for Anna Billing
//!
//! This module contains the core domain models shared by the readers, the
//! merger and the charge calculator.

pub mod call_record;
pub mod charge;
pub mod phone;
pub mod rate;
pub mod source;

pub use call_record::{CallRecord, MergeKey, Timestamp, PLACEHOLDER};
pub use charge::{billable_minutes, Charge};
pub use phone::{PhoneId, ToPhoneId, SCANCALL};
pub use rate::{ClientRateConfig, RateType, S2cNumbers, DEFAULT_CARRIER};
pub use source::{PrimaryRow, SecondaryRow};
