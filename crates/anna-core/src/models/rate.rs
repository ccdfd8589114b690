//! Client rate configuration
//!
//! One entry per client, read-only for the duration of a run.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Carrier used when a client does not name one
pub const DEFAULT_CARRIER: &str = "Atlasat";

/// How a rate is applied to a call duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    /// Duration rounded up to whole minutes
    #[default]
    PerMinute,
    /// Exact seconds
    PerSecond,
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateType::PerMinute => write!(f, "per_minute"),
            RateType::PerSecond => write!(f, "per_second"),
        }
    }
}

/// S2C target: a single number or a list of numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum S2cNumbers {
    One(String),
    Many(Vec<String>),
}

impl S2cNumbers {
    /// Flatten into a list
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            S2cNumbers::One(n) => vec![n.clone()],
            S2cNumbers::Many(list) => list.clone(),
        }
    }
}

/// Per-client rate configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClientRateConfig {
    /// Client identifier (exact-match lookup key)
    #[validate(length(min = 1, message = "Client identifier is required"))]
    pub client: String,

    /// Carrier tag, selects the international rate table
    #[serde(default = "default_carrier")]
    pub carrier: String,

    /// Base rate
    #[serde(default)]
    pub rate: Option<Decimal>,

    #[serde(default)]
    pub rate_type: RateType,

    // Special number overrides
    #[serde(default)]
    pub number1: Option<String>,
    #[serde(default)]
    pub number1_rate: Option<Decimal>,
    #[serde(default)]
    pub number1_rate_type: RateType,
    #[serde(default)]
    pub number1_chargeable_call_types: Vec<String>,

    #[serde(default)]
    pub number2: Option<String>,
    #[serde(default)]
    pub number2_rate: Option<Decimal>,
    #[serde(default)]
    pub number2_rate_type: RateType,
    #[serde(default)]
    pub number2_chargeable_call_types: Vec<String>,

    // S2C routing
    #[serde(default)]
    pub s2c: Option<S2cNumbers>,
    #[serde(default)]
    pub s2c_rate: Option<Decimal>,
    #[serde(default)]
    pub s2c_rate_type: RateType,

    /// Call types charged at the base rate (empty = every type)
    #[serde(default)]
    pub chargeable_call_types: Vec<String>,
}

fn default_carrier() -> String {
    DEFAULT_CARRIER.to_string()
}

impl ClientRateConfig {
    /// Minimal configuration for a client
    pub fn new(client: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            ..Default::default()
        }
    }

    /// Enduser clients carry a surcharge on premium and international calls
    pub fn is_enduser(&self) -> bool {
        self.client.to_lowercase().contains("enduser")
    }
}

impl Default for ClientRateConfig {
    fn default() -> Self {
        Self {
            client: String::new(),
            carrier: default_carrier(),
            rate: None,
            rate_type: RateType::PerMinute,
            number1: None,
            number1_rate: None,
            number1_rate_type: RateType::PerMinute,
            number1_chargeable_call_types: Vec::new(),
            number2: None,
            number2_rate: None,
            number2_rate_type: RateType::PerMinute,
            number2_chargeable_call_types: Vec::new(),
            s2c: None,
            s2c_rate: None,
            s2c_rate_type: RateType::PerMinute,
            chargeable_call_types: Vec::new(),
        }
    }
}
