//! Static number classification tables
//!
//! Built once on first use and shared read-only by every classification.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const CATEGORY_INTERNAL: &str = "Internal Call";
pub const CATEGORY_INTERNAL_NO_ANSWER: &str = "Internal Call (No answer)";
pub const CATEGORY_VOICEMAIL: &str = "Voicemail";
pub const CATEGORY_AUTOMATIC_TRANSFER: &str = "Automatic Transfer";
pub const CATEGORY_MONITORING: &str = "Monitoring";
pub const CATEGORY_SCANCALL: &str = "scancall";
pub const CATEGORY_PREMIUM: &str = "Premium Call";
pub const CATEGORY_TOLL_FREE: &str = "Toll-Free";
pub const CATEGORY_SPLIT_CHARGE: &str = "Split Charge";
pub const CATEGORY_UNKNOWN: &str = "Unknown number type";
pub const INTERNATIONAL_PREFIX: &str = "International - ";

/// Short service numbers (3 to 5 digits)
pub static EMERGENCY_NUMBERS: Lazy<HashMap<u64, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (110, "Police"),
        (112, "Emergency Call Center"),
        (113, "Fire Department"),
        (115, "Search and Rescue"),
        (118, "Ambulance"),
        (119, "Ambulance"),
        (129, "Disaster Management"),
        (1500, "Emergency Hotline"),
        (14045, "Emergency Hotline"),
    ])
});

/// Regional and mobile operator prefixes, longest first
pub static PHONE_PREFIXES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    let mut prefixes = vec![
        // Mobile operators
        ("811", "Mobile - Telkomsel"),
        ("812", "Mobile - Telkomsel"),
        ("813", "Mobile - Telkomsel"),
        ("821", "Mobile - Telkomsel"),
        ("822", "Mobile - Telkomsel"),
        ("823", "Mobile - Telkomsel"),
        ("851", "Mobile - Telkomsel"),
        ("852", "Mobile - Telkomsel"),
        ("853", "Mobile - Telkomsel"),
        ("814", "Mobile - Indosat"),
        ("815", "Mobile - Indosat"),
        ("816", "Mobile - Indosat"),
        ("855", "Mobile - Indosat"),
        ("856", "Mobile - Indosat"),
        ("857", "Mobile - Indosat"),
        ("858", "Mobile - Indosat"),
        ("817", "Mobile - XL"),
        ("818", "Mobile - XL"),
        ("819", "Mobile - XL"),
        ("859", "Mobile - XL"),
        ("877", "Mobile - XL"),
        ("878", "Mobile - XL"),
        ("831", "Mobile - Axis"),
        ("832", "Mobile - Axis"),
        ("833", "Mobile - Axis"),
        ("838", "Mobile - Axis"),
        ("881", "Mobile - Smartfren"),
        ("882", "Mobile - Smartfren"),
        ("883", "Mobile - Smartfren"),
        ("884", "Mobile - Smartfren"),
        ("885", "Mobile - Smartfren"),
        ("886", "Mobile - Smartfren"),
        ("887", "Mobile - Smartfren"),
        ("888", "Mobile - Smartfren"),
        ("889", "Mobile - Smartfren"),
        ("895", "Mobile - Tri"),
        ("896", "Mobile - Tri"),
        ("897", "Mobile - Tri"),
        ("898", "Mobile - Tri"),
        ("899", "Mobile - Tri"),
        // Premium rate
        ("809", CATEGORY_PREMIUM),
        ("8091", CATEGORY_PREMIUM),
        // Area codes
        ("22", "Fixed Line - Bandung"),
        ("24", "Fixed Line - Semarang"),
        ("251", "Fixed Line - Bogor"),
        ("254", "Fixed Line - Serang"),
        ("274", "Fixed Line - Yogyakarta"),
        ("341", "Fixed Line - Malang"),
        ("361", "Fixed Line - Denpasar"),
        ("411", "Fixed Line - Makassar"),
        ("431", "Fixed Line - Manado"),
        ("511", "Fixed Line - Banjarmasin"),
        ("541", "Fixed Line - Samarinda"),
        ("542", "Fixed Line - Balikpapan"),
        ("561", "Fixed Line - Pontianak"),
        ("711", "Fixed Line - Palembang"),
        ("721", "Fixed Line - Bandar Lampung"),
        ("751", "Fixed Line - Padang"),
        ("761", "Fixed Line - Pekanbaru"),
        ("778", "Fixed Line - Batam"),
    ];
    prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    prefixes
});

/// Fallback prefixes in fixed precedence order
pub const SPECIAL_PREFIXES: &[(&str, &str)] = &[
    ("211500", CATEGORY_SPLIT_CHARGE),
    ("211400", CATEGORY_SPLIT_CHARGE),
    ("21150", CATEGORY_SPLIT_CHARGE),
    ("21140", CATEGORY_SPLIT_CHARGE),
    ("1500", CATEGORY_SPLIT_CHARGE),
    ("1400", CATEGORY_SPLIT_CHARGE),
    ("800", CATEGORY_TOLL_FREE),
    ("84", "Mobile - Other"),
    ("31", "Fixed Line - Surabaya"),
    ("21", "Fixed Line - Jakarta"),
    ("8", "Mobile - Other"),
];

/// Country calling codes, matched in table order
pub const INTERNATIONAL_PHONE_PREFIXES: &[(&str, &str)] = &[
    ("+65", "Singapore"),
    ("+60", "Malaysia"),
    ("+61", "Australia"),
    ("+63", "Philippines"),
    ("+66", "Thailand"),
    ("+852", "Hong Kong"),
    ("+86", "China"),
    ("+886", "Taiwan"),
    ("+81", "Japan"),
    ("+82", "South Korea"),
    ("+84", "Vietnam"),
    ("+91", "India"),
    ("+966", "Saudi Arabia"),
    ("+971", "United Arab Emirates"),
    ("+44", "United Kingdom"),
    ("+49", "Germany"),
    ("+31", "Netherlands"),
    ("+1", "United States"),
];

/// Whether a category names an emergency service (case-insensitive)
pub fn is_emergency_category(category: &str) -> bool {
    EMERGENCY_NUMBERS
        .values()
        .any(|name| name.eq_ignore_ascii_case(category))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_prefixes_longest_first() {
        let lengths: Vec<usize> = PHONE_PREFIXES.iter().map(|(p, _)| p.len()).collect();
        assert!(lengths.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(PHONE_PREFIXES[0].0, "8091");
    }

    #[test]
    fn test_special_prefixes_never_shadowed_by_regional_table() {
        for (special, _) in SPECIAL_PREFIXES {
            assert!(
                !PHONE_PREFIXES.iter().any(|(p, _)| p == special),
                "{special} duplicated"
            );
        }
    }

    #[test]
    fn test_is_emergency_category() {
        assert!(is_emergency_category("police"));
        assert!(is_emergency_category("Ambulance"));
        assert!(!is_emergency_category("Premium Call"));
    }
}
