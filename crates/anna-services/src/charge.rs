//! Charge calculation
//!
//! A call's charge is decided by an ordered table of named rules. Each rule
//! either commits to a charge or declines; the first rule that commits wins
//! and nothing after it runs.
//!
//! | # | rule | commits when |
//! |---|------|--------------|
//! | 0 | `unconfigured_client` | client has no rate configuration |
//! | 1 | `zero_charge_allowlist` | origin allowlisted and client flagged |
//! | 2 | `internal_call` | category is `Internal Call` |
//! | 3 | `premium` | premium, toll-free, split charge or emergency |
//! | 4 | `international` | carrier table has the category's country |
//! | 5 | `s2c` | call touches an S2C number or is a scancall |
//! | 6 | `number1_override` | number1 endpoint with an allowed call type |
//! | 7 | `number2_override` | number2 endpoint with an allowed call type |
//! | 8 | `chargeable_base_rate` | type allowed by the client list and base rate set |
//! | 9 | `chargeable_fallback` | type in the chargeable list (defaults applied) |
//! | 10 | `non_chargeable` | type not in the chargeable list |
//! | 11 | `absolute_fallback` | always |

use anna_core::config::BillingConfig;
use anna_core::models::{CallRecord, Charge, ClientRateConfig, PhoneId, RateType};
use anna_core::traits::RateConfigSource;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::classifier::classify;
use crate::international_rates::international_rate;
use crate::normalizer::normalize_phone;
use crate::tables::{
    is_emergency_category, CATEGORY_INTERNAL, CATEGORY_PREMIUM, CATEGORY_SCANCALL,
    CATEGORY_SPLIT_CHARGE, CATEGORY_TOLL_FREE,
};

/// Chargeable call types used when a client leaves its list empty
pub const DEFAULT_CHARGEABLE_CALL_TYPES: &[&str] = &["outbound call", "predictive dialer"];

/// Call types always billed at the S2C rate on an S2C route
pub const S2C_INBOUND_CALL_TYPES: &[&str] = &["incoming call", "answering machine"];

/// Client configuration with numbers canonicalized and call types lower-cased
#[derive(Debug, Clone)]
pub struct ResolvedRates {
    pub config: ClientRateConfig,
    s2c: Vec<PhoneId>,
    number1: Option<PhoneId>,
    number2: Option<PhoneId>,
    number1_types: Vec<String>,
    number2_types: Vec<String>,
    /// Client list as configured (empty = every type)
    allowed_types: Vec<String>,
    /// Client list, or the defaults when empty
    chargeable_types: Vec<String>,
}

impl ResolvedRates {
    pub fn new(config: ClientRateConfig) -> Self {
        let lower = |types: &[String]| -> Vec<String> {
            types.iter().map(|t| t.trim().to_lowercase()).collect()
        };

        let allowed_types = lower(&config.chargeable_call_types);
        let chargeable_types = if allowed_types.is_empty() {
            DEFAULT_CHARGEABLE_CALL_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect()
        } else {
            allowed_types.clone()
        };

        Self {
            s2c: config
                .s2c
                .as_ref()
                .map(|s| s.to_vec().iter().map(|n| normalize_phone(n)).collect())
                .unwrap_or_default(),
            number1: config.number1.as_deref().map(normalize_phone),
            number2: config.number2.as_deref().map(normalize_phone),
            number1_types: lower(&config.number1_chargeable_call_types),
            number2_types: lower(&config.number2_chargeable_call_types),
            allowed_types,
            chargeable_types,
            config,
        }
    }
}

/// Read-only client rate lookup, keyed by client identifier
#[derive(Debug, Clone, Default)]
pub struct RateBook {
    clients: HashMap<String, ResolvedRates>,
}

impl RateBook {
    /// Build from configurations in priority order (first entry per client wins)
    pub fn new(configs: impl IntoIterator<Item = ClientRateConfig>) -> Self {
        let mut clients = HashMap::new();
        for config in configs {
            clients
                .entry(config.client.clone())
                .or_insert_with(|| ResolvedRates::new(config));
        }
        Self { clients }
    }

    pub fn resolved(&self, client: &str) -> Option<&ResolvedRates> {
        self.clients.get(client)
    }
}

impl RateConfigSource for RateBook {
    fn rate_config(&self, client: &str) -> Option<&ClientRateConfig> {
        self.clients.get(client).map(|r| &r.config)
    }

    fn len(&self) -> usize {
        self.clients.len()
    }
}

/// Global billing constants and the zero-charge allowlist
#[derive(Debug, Clone)]
pub struct BillingPolicy {
    pub zero_charge_callers: HashSet<PhoneId>,
    pub zero_charge_clients: HashSet<String>,
    pub default_rate: Decimal,
    pub premium_rate: Decimal,
    pub enduser_surcharge: Decimal,
}

impl From<&BillingConfig> for BillingPolicy {
    fn from(config: &BillingConfig) -> Self {
        Self {
            zero_charge_callers: config
                .zero_charge_callers
                .iter()
                .map(|n| normalize_phone(n))
                .collect(),
            zero_charge_clients: config.zero_charge_clients.iter().cloned().collect(),
            default_rate: config.default_rate,
            premium_rate: config.premium_rate,
            enduser_surcharge: config.enduser_surcharge,
        }
    }
}

impl Default for BillingPolicy {
    fn default() -> Self {
        Self::from(&BillingConfig::default())
    }
}

/// Everything a rule may look at for one call
pub struct ChargeContext<'a> {
    pub record: &'a CallRecord,
    pub rates: Option<&'a ResolvedRates>,
    pub policy: &'a BillingPolicy,
    /// Lower-cased destination category
    pub category: String,
    /// Lower-cased, trimmed call type
    pub call_type: String,
}

impl ChargeContext<'_> {
    fn surcharge(&self) -> Decimal {
        match self.rates {
            Some(r) if r.config.is_enduser() => self.policy.enduser_surcharge,
            _ => Decimal::ZERO,
        }
    }

    fn per_minute(&self, rate: Decimal) -> Charge {
        Charge::per_minute(self.record.call_duration, rate)
    }

    fn apply(&self, rate_type: RateType, rate: Decimal) -> Charge {
        Charge::apply(rate_type, self.record.call_duration, rate)
    }

    fn touches(&self, number: &PhoneId) -> bool {
        self.record.call_to == *number || self.record.call_from == *number
    }
}

/// One entry of the charge cascade
pub struct ChargeRule {
    pub name: &'static str,
    pub apply: fn(&ChargeContext<'_>) -> Option<Charge>,
}

/// The charge cascade in priority order
pub const CHARGE_RULES: &[ChargeRule] = &[
    ChargeRule {
        name: "unconfigured_client",
        apply: unconfigured_client,
    },
    ChargeRule {
        name: "zero_charge_allowlist",
        apply: zero_charge_allowlist,
    },
    ChargeRule {
        name: "internal_call",
        apply: internal_call,
    },
    ChargeRule {
        name: "premium",
        apply: premium,
    },
    ChargeRule {
        name: "international",
        apply: international,
    },
    ChargeRule {
        name: "s2c",
        apply: s2c,
    },
    ChargeRule {
        name: "number1_override",
        apply: number1_override,
    },
    ChargeRule {
        name: "number2_override",
        apply: number2_override,
    },
    ChargeRule {
        name: "chargeable_base_rate",
        apply: chargeable_base_rate,
    },
    ChargeRule {
        name: "chargeable_fallback",
        apply: chargeable_fallback,
    },
    ChargeRule {
        name: "non_chargeable",
        apply: non_chargeable,
    },
    ChargeRule {
        name: "absolute_fallback",
        apply: absolute_fallback,
    },
];

fn unconfigured_client(ctx: &ChargeContext<'_>) -> Option<Charge> {
    match ctx.rates {
        None => Some(ctx.per_minute(ctx.policy.default_rate)),
        Some(_) => None,
    }
}

fn zero_charge_allowlist(ctx: &ChargeContext<'_>) -> Option<Charge> {
    let rates = ctx.rates?;
    let allowlisted = ctx.policy.zero_charge_callers.contains(&ctx.record.call_from);
    let flagged = ctx.policy.zero_charge_clients.contains(&rates.config.client);
    (allowlisted && flagged).then_some(Charge::ZERO)
}

fn internal_call(ctx: &ChargeContext<'_>) -> Option<Charge> {
    (ctx.category == CATEGORY_INTERNAL.to_lowercase()).then(|| ctx.per_minute(Decimal::ZERO))
}

fn premium(ctx: &ChargeContext<'_>) -> Option<Charge> {
    let premium_categories = [CATEGORY_PREMIUM, CATEGORY_TOLL_FREE, CATEGORY_SPLIT_CHARGE];
    let is_premium = premium_categories
        .iter()
        .any(|c| c.eq_ignore_ascii_case(&ctx.category))
        || is_emergency_category(&ctx.category);

    is_premium.then(|| ctx.per_minute(ctx.policy.premium_rate + ctx.surcharge()))
}

fn international(ctx: &ChargeContext<'_>) -> Option<Charge> {
    let rates = ctx.rates?;
    let rate = international_rate(&rates.config.carrier, &ctx.category)?;
    Some(ctx.per_minute(rate + ctx.surcharge()))
}

fn s2c(ctx: &ChargeContext<'_>) -> Option<Charge> {
    let rates = ctx.rates?;

    let target = if ctx.record.call_to.is_empty() {
        &ctx.record.call_from
    } else {
        &ctx.record.call_to
    };
    let on_route = rates.s2c.contains(target) || ctx.category == CATEGORY_SCANCALL;
    if !on_route {
        return None;
    }

    let billable = S2C_INBOUND_CALL_TYPES.contains(&ctx.call_type.as_str())
        || rates.chargeable_types.contains(&ctx.call_type);
    if !billable {
        return None;
    }

    let rate = rates.config.s2c_rate?;
    Some(ctx.apply(rates.config.s2c_rate_type, rate))
}

fn number_override(
    ctx: &ChargeContext<'_>,
    number: Option<&PhoneId>,
    allowed_types: &[String],
    rate: Option<Decimal>,
    rate_type: RateType,
) -> Option<Charge> {
    let number = number?;
    if !allowed_types.contains(&ctx.call_type) || !ctx.touches(number) {
        return None;
    }
    let rate = rate
        .filter(|r| !r.is_zero())
        .unwrap_or(ctx.policy.default_rate);
    Some(ctx.apply(rate_type, rate))
}

fn number1_override(ctx: &ChargeContext<'_>) -> Option<Charge> {
    let rates = ctx.rates?;
    number_override(
        ctx,
        rates.number1.as_ref(),
        &rates.number1_types,
        rates.config.number1_rate,
        rates.config.number1_rate_type,
    )
}

fn number2_override(ctx: &ChargeContext<'_>) -> Option<Charge> {
    let rates = ctx.rates?;
    number_override(
        ctx,
        rates.number2.as_ref(),
        &rates.number2_types,
        rates.config.number2_rate,
        rates.config.number2_rate_type,
    )
}

fn chargeable_base_rate(ctx: &ChargeContext<'_>) -> Option<Charge> {
    let rates = ctx.rates?;
    let allowed = rates.allowed_types.is_empty() || rates.allowed_types.contains(&ctx.call_type);
    if !allowed {
        return None;
    }
    // An unset base rate defers to the fallback below
    let rate = rates.config.rate?;
    Some(ctx.apply(rates.config.rate_type, rate))
}

fn chargeable_fallback(ctx: &ChargeContext<'_>) -> Option<Charge> {
    let rates = ctx.rates?;
    if !rates.chargeable_types.contains(&ctx.call_type) {
        return None;
    }
    let rate = rates.config.rate.unwrap_or(ctx.policy.default_rate);
    Some(ctx.apply(rates.config.rate_type, rate))
}

fn non_chargeable(ctx: &ChargeContext<'_>) -> Option<Charge> {
    let rates = ctx.rates?;
    (!rates.chargeable_types.contains(&ctx.call_type)).then_some(Charge::ZERO)
}

fn absolute_fallback(ctx: &ChargeContext<'_>) -> Option<Charge> {
    Some(ctx.per_minute(ctx.policy.default_rate))
}

/// Result of running the cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeOutcome {
    /// Name of the rule that committed
    pub rule: &'static str,
    pub charge: Charge,
}

/// Applies the charge cascade with a fixed rate book and policy
#[derive(Debug, Clone, Default)]
pub struct ChargeCalculator {
    book: RateBook,
    policy: BillingPolicy,
}

impl ChargeCalculator {
    pub fn new(book: RateBook, policy: BillingPolicy) -> Self {
        Self { book, policy }
    }

    pub fn book(&self) -> &RateBook {
        &self.book
    }

    pub fn policy(&self) -> &BillingPolicy {
        &self.policy
    }

    /// Compute the charge for a record
    ///
    /// Uses the record's `number_type` when already classified.
    pub fn compute(&self, record: &CallRecord) -> ChargeOutcome {
        let category = record
            .number_type
            .clone()
            .unwrap_or_else(|| classify(&record.call_to, &record.call_type, &record.call_from));

        let ctx = ChargeContext {
            record,
            rates: self.book.resolved(&record.client),
            policy: &self.policy,
            category: category.to_lowercase(),
            call_type: record.call_type.trim().to_lowercase(),
        };

        let outcome = CHARGE_RULES
            .iter()
            .find_map(|rule| {
                (rule.apply)(&ctx).map(|charge| ChargeOutcome {
                    rule: rule.name,
                    charge,
                })
            })
            .unwrap_or(ChargeOutcome {
                rule: "absolute_fallback",
                charge: ctx.per_minute(self.policy.default_rate),
            });

        debug!(
            sequence_id = %record.sequence_id,
            rule = outcome.rule,
            charge = %outcome.charge,
            "Charge computed"
        );

        outcome
    }

    /// Compute the charge for a record, discarding the rule name
    pub fn compute_charge(&self, record: &CallRecord) -> Charge {
        self.compute(record).charge
    }
}
