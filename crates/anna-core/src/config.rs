//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use tracing::{debug, info};
use validator::Validate;

use crate::error::AppError;
use crate::models::ClientRateConfig;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct AppConfig {
    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub billing: BillingConfig,

    /// Clients in processing order
    #[serde(default)]
    #[validate(nested)]
    pub clients: Vec<ClientEntry>,
}

/// Batch run configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RunConfig {
    /// Maximum number of clients processed at the same time
    #[serde(default = "default_workers")]
    pub max_workers: usize,
}

fn default_workers() -> usize {
    num_cpus::get()
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_workers: default_workers(),
        }
    }
}

/// Billing-specific configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BillingConfig {
    /// Origin numbers that are never charged for flagged clients
    #[serde(default = "default_zero_charge_callers")]
    pub zero_charge_callers: Vec<String>,

    /// Clients the zero-charge allowlist applies to
    #[serde(default = "default_zero_charge_clients")]
    pub zero_charge_clients: Vec<String>,

    /// Fallback rate per minute
    #[serde(default = "default_rate")]
    pub default_rate: Decimal,

    /// Per-minute rate for premium, toll-free, split-charge and emergency calls
    #[serde(default = "default_premium_rate")]
    pub premium_rate: Decimal,

    /// Added to premium and international rates for enduser clients
    #[serde(default = "default_enduser_surcharge")]
    pub enduser_surcharge: Decimal,
}

fn default_zero_charge_callers() -> Vec<String> {
    [
        "2150913403",
        "85161662298",
        "85157455618",
        "82248400487",
        "2150913400",
        "2131141271",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_zero_charge_clients() -> Vec<String> {
    vec!["siemens-id".to_string()]
}

fn default_rate() -> Decimal {
    Decimal::from(720)
}

fn default_premium_rate() -> Decimal {
    Decimal::from(1700)
}

fn default_enduser_surcharge() -> Decimal {
    Decimal::from(200)
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            zero_charge_callers: default_zero_charge_callers(),
            zero_charge_clients: default_zero_charge_clients(),
            default_rate: default_rate(),
            premium_rate: default_premium_rate(),
            enduser_surcharge: default_enduser_surcharge(),
        }
    }
}

/// One client's input files, output file and rates
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ClientEntry {
    /// Dashboard (primary) export
    #[validate(length(min = 1, message = "Dashboard file is required"))]
    pub dashboard: String,

    /// Console (secondary) export
    #[validate(length(min = 1, message = "Console file is required"))]
    pub console: String,

    /// Merged output file
    #[validate(length(min = 1, message = "Output file is required"))]
    pub output: String,

    #[serde(flatten)]
    #[validate(nested)]
    pub rates: ClientRateConfig,
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, AppError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        debug!(
            "Loading configuration layers: config/default, config/{}, ANNA__* environment",
            run_mode
        );

        let config = Config::builder()
            .set_default("run.max_workers", num_cpus::get() as i64)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with ANNA_ prefix
            .add_source(
                Environment::with_prefix("ANNA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::finish(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, AppError> {
        debug!("Loading configuration from {}", path);
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("ANNA").separator("__"))
            .build()?;

        Self::finish(config)
    }

    fn finish(config: Config) -> Result<Self, AppError> {
        let app: AppConfig = config
            .try_deserialize()
            .map_err(|e: ConfigError| AppError::Config(e.to_string()))?;
        app.validate()?;
        info!("Configuration loaded: {} clients", app.clients.len());
        Ok(app)
    }

    /// Rate configurations in client order
    pub fn rate_configs(&self) -> Vec<ClientRateConfig> {
        self.clients.iter().map(|c| c.rates.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_billing_config() {
        let config = BillingConfig::default();
        assert_eq!(config.default_rate, Decimal::from(720));
        assert_eq!(config.premium_rate, Decimal::from(1700));
        assert_eq!(config.zero_charge_clients, vec!["siemens-id"]);
        assert!(config.zero_charge_callers.contains(&"2150913400".to_string()));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clients.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[run]
max_workers = 2

[[clients]]
client = "acme"
dashboard = "in/acme-dashboard.csv"
console = "in/acme-console.csv"
output = "out/acme.csv"
rate = 720
rate_type = "per_minute"
chargeable_call_types = ["Outbound call"]
"#
        )
        .unwrap();

        let config = AppConfig::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.run.max_workers, 2);
        assert_eq!(config.clients.len(), 1);
        assert_eq!(config.clients[0].rates.client, "acme");
        assert_eq!(config.clients[0].rates.rate, Some(Decimal::from(720)));
        assert_eq!(config.billing.default_rate, Decimal::from(720));
    }
}
