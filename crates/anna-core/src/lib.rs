//! Anna Billing Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the Anna Billing call reconciliation system. It includes:
//!
//! - Domain models (CallRecord, PhoneId, ClientRateConfig, Charge)
//! - Raw source rows for the dashboard and console exports
//! - Seams for rate lookup and record output
//! - Unified error handling
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
