//! Call charge amount
//!
//! Charges are exported as decimal strings. Per-minute amounts print as whole
//! numbers when integral (`1440`); per-second amounts always keep a fractional
//! digit (`5000.0`).

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;

use super::rate::RateType;

/// Monetary charge for one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charge(Decimal);

impl Charge {
    /// Zero charge, printed as `0`
    pub const ZERO: Charge = Charge(Decimal::ZERO);

    /// `ceil(seconds / 60) * rate`
    pub fn per_minute(duration: Duration, rate: Decimal) -> Self {
        let minutes = billable_minutes(duration);
        Charge((Decimal::from(minutes) * rate).normalize())
    }

    /// `seconds * rate`
    pub fn per_second(duration: Duration, rate: Decimal) -> Self {
        let seconds = duration.num_seconds().max(0);
        let mut amount = (Decimal::from(seconds) * rate).normalize();
        if amount.scale() == 0 {
            amount.rescale(1);
        }
        Charge(amount)
    }

    /// Apply a rate according to its rate type
    pub fn apply(rate_type: RateType, duration: Duration, rate: Decimal) -> Self {
        match rate_type {
            RateType::PerMinute => Self::per_minute(duration, rate),
            RateType::PerSecond => Self::per_second(duration, rate),
        }
    }

    /// Underlying amount
    pub fn amount(&self) -> Decimal {
        self.0
    }
}

/// Whole minutes billed for a duration, rounded up
pub fn billable_minutes(duration: Duration) -> i64 {
    let seconds = duration.num_seconds().max(0);
    (seconds + 59) / 60
}

impl fmt::Display for Charge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Charge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_per_minute_rounds_up() {
        let charge = Charge::per_minute(Duration::seconds(150), dec!(720));
        assert_eq!(charge.to_string(), "2160");

        let charge = Charge::per_minute(Duration::seconds(90), dec!(720));
        assert_eq!(charge.to_string(), "1440");

        let charge = Charge::per_minute(Duration::seconds(60), dec!(720));
        assert_eq!(charge.to_string(), "720");

        let charge = Charge::per_minute(Duration::seconds(61), dec!(720));
        assert_eq!(charge.to_string(), "1440");
    }

    #[test]
    fn test_per_minute_zero_rate() {
        let charge = Charge::per_minute(Duration::seconds(3600), dec!(0));
        assert_eq!(charge.to_string(), "0");
        assert_eq!(charge, Charge::ZERO);
    }

    #[test]
    fn test_per_second_keeps_fraction_digit() {
        let charge = Charge::per_second(Duration::seconds(10), dec!(500));
        assert_eq!(charge.to_string(), "5000.0");

        let charge = Charge::per_second(Duration::seconds(3), dec!(12.5));
        assert_eq!(charge.to_string(), "37.5");
    }

    #[test]
    fn test_apply_dispatches_on_rate_type() {
        let d = Duration::seconds(90);
        assert_eq!(Charge::apply(RateType::PerMinute, d, dec!(10)).amount(), dec!(20));
        assert_eq!(Charge::apply(RateType::PerSecond, d, dec!(10)).amount(), dec!(900));
    }

    #[test]
    fn test_billable_minutes() {
        assert_eq!(billable_minutes(Duration::zero()), 0);
        assert_eq!(billable_minutes(Duration::seconds(1)), 1);
        assert_eq!(billable_minutes(Duration::seconds(120)), 2);
    }
}
