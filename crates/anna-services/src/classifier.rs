//! Number classification
//!
//! Assigns a destination category to a call. Rules are evaluated in order and
//! the first hit wins: call-type overrides and structural checks come before
//! any prefix table so operational calls are never read as destinations.

use anna_core::models::PhoneId;

use crate::tables::{
    CATEGORY_AUTOMATIC_TRANSFER, CATEGORY_INTERNAL, CATEGORY_INTERNAL_NO_ANSWER,
    CATEGORY_MONITORING, CATEGORY_SCANCALL, CATEGORY_UNKNOWN, CATEGORY_VOICEMAIL,
    EMERGENCY_NUMBERS, INTERNATIONAL_PHONE_PREFIXES, INTERNATIONAL_PREFIX, PHONE_PREFIXES,
    SPECIAL_PREFIXES,
};

const CALL_TRANSFER: &str = "Call transfer";

/// Classify a call's destination
pub fn classify(call_to: &PhoneId, call_type: &str, call_from: &PhoneId) -> String {
    if let Some(category) = classify_call_type(call_type) {
        return category.to_string();
    }

    if call_from.is_scancall() {
        return CATEGORY_SCANCALL.to_string();
    }

    if call_type == CALL_TRANSFER && is_extension(call_from) {
        return CATEGORY_INTERNAL.to_string();
    }

    let digits = call_to.to_string();

    if let Some(category) = emergency_category(call_to, &digits) {
        return category.to_string();
    }

    if let Some((_, category)) = PHONE_PREFIXES
        .iter()
        .find(|(prefix, _)| digits.starts_with(prefix))
    {
        return category.to_string();
    }

    if let Some((_, category)) = SPECIAL_PREFIXES
        .iter()
        .find(|(prefix, _)| digits.starts_with(prefix))
    {
        return category.to_string();
    }

    if let Some((_, country)) = INTERNATIONAL_PHONE_PREFIXES
        .iter()
        .find(|(prefix, _)| digits.starts_with(prefix.trim_start_matches('+')))
    {
        return format!("{}{}", INTERNATIONAL_PREFIX, country);
    }

    CATEGORY_UNKNOWN.to_string()
}

/// Categories decided by the call-type label alone
fn classify_call_type(call_type: &str) -> Option<&'static str> {
    match call_type {
        "Internal Call" | "EXTENSION" => Some(CATEGORY_INTERNAL),
        "Internal Call (No answer)" => Some(CATEGORY_INTERNAL_NO_ANSWER),
        "AUTOMATIC_RECORD" => Some(CATEGORY_VOICEMAIL),
        "AUTOMATIC_TRANSFER" => Some(CATEGORY_AUTOMATIC_TRANSFER),
        "Monitoring" => Some(CATEGORY_MONITORING),
        _ => None,
    }
}

/// Three-digit numeric origin (a PBX extension)
fn is_extension(call_from: &PhoneId) -> bool {
    call_from
        .as_number()
        .map(|n| n.to_string().len() == 3)
        .unwrap_or(false)
}

fn emergency_category(call_to: &PhoneId, digits: &str) -> Option<&'static str> {
    if !(3..=5).contains(&digits.len()) {
        return None;
    }
    call_to
        .as_number()
        .and_then(|n| EMERGENCY_NUMBERS.get(&n).copied())
}
