//! Canonical phone identifier
//!
//! Both call sources print numbers differently (`+62 812-3456`, `812 3456`,
//! `scancall`). Everything downstream of parsing compares [`PhoneId`] values.

use serde::{Serialize, Serializer};
use std::fmt;

/// Country code stripped from the front of every number
pub const COUNTRY_PREFIX: &str = "62";

/// Symbolic origin used by the scan-call routing
pub const SCANCALL: &str = "scancall";

/// Canonical phone identifier
///
/// Numeric when the cleaned value parses as an integer, symbolic otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhoneId {
    Number(u64),
    Symbol(String),
}

impl PhoneId {
    /// Canonicalize a raw phone string
    ///
    /// Strips `+`, hyphens, parentheses and spaces, drops a leading `62`
    /// country code, then tries an integer parse.
    pub fn parse(raw: &str) -> Self {
        if raw == SCANCALL {
            return PhoneId::Symbol(raw.to_string());
        }

        let cleaned: String = raw
            .chars()
            .filter(|c| !matches!(c, '+' | '-' | '(' | ')' | ' '))
            .collect();

        let cleaned = cleaned
            .strip_prefix(COUNTRY_PREFIX)
            .map(str::to_string)
            .unwrap_or(cleaned);

        match cleaned.parse::<u64>() {
            Ok(n) => PhoneId::Number(n),
            Err(_) => PhoneId::Symbol(cleaned),
        }
    }

    /// Numeric value, if any
    pub fn as_number(&self) -> Option<u64> {
        match self {
            PhoneId::Number(n) => Some(*n),
            PhoneId::Symbol(_) => None,
        }
    }

    /// True for the `scancall` symbolic origin
    pub fn is_scancall(&self) -> bool {
        matches!(self, PhoneId::Symbol(s) if s == SCANCALL)
    }

    /// True when the identifier is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, PhoneId::Symbol(s) if s.is_empty())
    }
}

impl fmt::Display for PhoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhoneId::Number(n) => write!(f, "{}", n),
            PhoneId::Symbol(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for PhoneId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Values that can be turned into a [`PhoneId`]
///
/// Raw strings go through [`PhoneId::parse`]; integers and identifiers that are
/// already canonical pass through unchanged.
pub trait ToPhoneId {
    fn to_phone_id(&self) -> PhoneId;
}

impl ToPhoneId for str {
    fn to_phone_id(&self) -> PhoneId {
        PhoneId::parse(self)
    }
}

impl ToPhoneId for String {
    fn to_phone_id(&self) -> PhoneId {
        PhoneId::parse(self)
    }
}

impl ToPhoneId for u64 {
    fn to_phone_id(&self) -> PhoneId {
        PhoneId::Number(*self)
    }
}

impl ToPhoneId for PhoneId {
    fn to_phone_id(&self) -> PhoneId {
        self.clone()
    }
}

impl<T: ToPhoneId + ?Sized> ToPhoneId for &T {
    fn to_phone_id(&self) -> PhoneId {
        (**self).to_phone_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_formatting_and_country_code() {
        assert_eq!(PhoneId::parse("+62 812-3456-7890"), PhoneId::Number(81234567890));
        assert_eq!(PhoneId::parse("(021) 5091 3400"), PhoneId::Number(2150913400));
        assert_eq!(PhoneId::parse("622150913400"), PhoneId::Number(2150913400));
    }

    #[test]
    fn test_parse_symbolic() {
        assert_eq!(PhoneId::parse("scancall"), PhoneId::Symbol("scancall".to_string()));
        assert_eq!(PhoneId::parse("anonymous"), PhoneId::Symbol("anonymous".to_string()));
        assert!(PhoneId::parse("scancall").is_scancall());
    }

    #[test]
    fn test_canonical_values_pass_through() {
        let id = PhoneId::Number(6281);
        assert_eq!(id.to_phone_id(), id);
        assert_eq!(6281u64.to_phone_id(), PhoneId::Number(6281));
    }

    #[test]
    fn test_display() {
        assert_eq!(PhoneId::Number(215091).to_string(), "215091");
        assert_eq!(PhoneId::Symbol("scancall".into()).to_string(), "scancall");
    }
}
