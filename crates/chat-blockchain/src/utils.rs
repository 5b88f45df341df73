use alloy::primitives::{
    U256,
    utils::{ParseUnits, parse_units},
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountFormatError {
    #[error("Amount '{amount}' is not a valid decimal: {reason}")]
    Invalid { amount: String, reason: String },

    #[error("Amount '{0}' is negative")]
    Negative(String),
}

/// Convert a decimal amount in display units (e.g. "0.1" ETH) into the
/// ledger's smallest integer unit.
pub fn parse_display_amount(amount: &str, decimals: u8) -> Result<U256, AmountFormatError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(AmountFormatError::Invalid {
            amount: amount.to_string(),
            reason: "empty amount".to_string(),
        });
    }
    if trimmed.starts_with('-') {
        return Err(AmountFormatError::Negative(amount.to_string()));
    }
    ensure_plain_decimal(trimmed, decimals).map_err(|reason| AmountFormatError::Invalid {
        amount: amount.to_string(),
        reason: reason.to_string(),
    })?;

    match parse_units(trimmed, decimals) {
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) => Err(AmountFormatError::Negative(amount.to_string())),
        Err(err) => Err(AmountFormatError::Invalid {
            amount: amount.to_string(),
            reason: err.to_string(),
        }),
    }
}

/// `<digits>[.<digits>]`, with no more fraction digits than `decimals`.
/// `parse_units` alone accepts `_` separators and truncates excess precision.
fn ensure_plain_decimal(amount: &str, decimals: u8) -> Result<(), &'static str> {
    let (whole, fraction) = match amount.split_once('.') {
        Some((_, "")) => return Err("decimal point must be followed by digits"),
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };

    if whole.is_empty() {
        return Err("decimal point must be preceded by digits");
    }
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err("only digits and a single decimal point are allowed");
    }
    if fraction.len() > usize::from(decimals) {
        return Err("more fraction digits than the token supports");
    }
    Ok(())
}
