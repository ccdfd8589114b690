//! International per-minute rates by carrier

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use anna_core::models::DEFAULT_CARRIER;

type RateTable = Vec<(&'static str, Decimal)>;

/// Country rate tables keyed by lower-case carrier name
pub static INTERNATIONAL_RATES: Lazy<HashMap<&'static str, RateTable>> = Lazy::new(|| {
    HashMap::from([
        (
            "atlasat",
            vec![
                ("Singapore", dec!(2500)),
                ("Malaysia", dec!(2500)),
                ("Australia", dec!(3500)),
                ("Philippines", dec!(4000)),
                ("Thailand", dec!(3500)),
                ("Hong Kong", dec!(3000)),
                ("China", dec!(3000)),
                ("Taiwan", dec!(4000)),
                ("Japan", dec!(4500)),
                ("South Korea", dec!(4500)),
                ("Vietnam", dec!(4000)),
                ("India", dec!(4000)),
                ("Saudi Arabia", dec!(6000)),
                ("United Arab Emirates", dec!(6000)),
                ("United Kingdom", dec!(4000)),
                ("Germany", dec!(4500)),
                ("Netherlands", dec!(4500)),
                ("United States", dec!(3000)),
            ],
        ),
        (
            "indosat",
            vec![
                ("Singapore", dec!(2200)),
                ("Malaysia", dec!(2200)),
                ("Australia", dec!(3300)),
                ("Hong Kong", dec!(2800)),
                ("China", dec!(2800)),
                ("Japan", dec!(4200)),
                ("South Korea", dec!(4200)),
                ("United Kingdom", dec!(3800)),
                ("United States", dec!(2800)),
            ],
        ),
        (
            "telkom",
            vec![
                ("Singapore", dec!(2400)),
                ("Malaysia", dec!(2400)),
                ("Australia", dec!(3600)),
                ("China", dec!(3100)),
                ("Japan", dec!(4600)),
                ("United States", dec!(3100)),
            ],
        ),
    ])
});

/// Rate table for a carrier, falling back to the default carrier's table
pub fn rate_table(carrier: &str) -> &'static [(&'static str, Decimal)] {
    let key = carrier.trim().to_lowercase();
    INTERNATIONAL_RATES
        .get(key.as_str())
        .or_else(|| INTERNATIONAL_RATES.get(DEFAULT_CARRIER.to_lowercase().as_str()))
        .map(|table| table.as_slice())
        .unwrap_or(&[])
}

/// First country in the carrier's table whose name appears in the category
pub fn international_rate(carrier: &str, category: &str) -> Option<Decimal> {
    let category = category.to_lowercase();
    rate_table(carrier)
        .iter()
        .find(|(country, _)| category.contains(&country.to_lowercase()))
        .map(|(_, rate)| *rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_carrier() {
        assert_eq!(
            international_rate("Indosat", "International - Singapore"),
            Some(dec!(2200))
        );
        assert_eq!(
            international_rate("ATLASAT", "International - Singapore"),
            Some(dec!(2500))
        );
    }

    #[test]
    fn test_unknown_carrier_uses_default_table() {
        assert_eq!(
            international_rate("MGM", "International - India"),
            Some(dec!(4000))
        );
    }

    #[test]
    fn test_missing_country_in_carrier_table() {
        assert_eq!(international_rate("Telkom", "International - India"), None);
    }

    #[test]
    fn test_domestic_categories_have_no_rate() {
        assert_eq!(international_rate("Atlasat", "Fixed Line - Jakarta"), None);
        assert_eq!(international_rate("Atlasat", "Unknown number type"), None);
    }
}
