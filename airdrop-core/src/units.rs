use alloy_primitives::{
    utils::{format_units, parse_units, Unit},
    U256,
};
use serde::{Deserialize, Serialize};

use crate::error::AmountError;

/// Symbol and precision used to scale human amounts into integer token units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountUnits {
    pub symbol: String,
    pub decimals: u8,
}

impl AmountUnits {
    pub fn new(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
        }
    }

    pub fn parse(&self, amount: &str) -> Result<U256, AmountError> {
        parse_amount(amount, self.decimals)
    }

    pub fn format(&self, amount: U256) -> Result<String, AmountError> {
        format_amount(amount, self.decimals)
    }
}

/// Converts a ui amount ("12.5") to a positive integer amount at `decimals` precision.
///
/// Input with more fractional digits than the token supports is rejected
/// instead of truncated.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }
    if amount.starts_with('-') {
        return Err(AmountError::Negative);
    }

    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(AmountError::NotANumber);
    }
    if Unit::new(decimals).is_none() {
        return Err(AmountError::UnsupportedDecimals(decimals));
    }
    if fraction.len() > decimals as usize {
        return Err(AmountError::TooPrecise(decimals));
    }

    let normalized = if whole.is_empty() {
        format!("0.{fraction}")
    } else {
        amount.to_string()
    };
    let value = parse_units(&normalized, decimals)
        .map_err(|_| AmountError::TooLarge)?
        .get_absolute();

    if value.is_zero() {
        return Err(AmountError::Zero);
    }
    Ok(value)
}

/// Exact decimal rendering of an integer token amount, trailing zeros trimmed.
pub fn format_amount(amount: U256, decimals: u8) -> Result<String, AmountError> {
    let formatted =
        format_units(amount, decimals).map_err(|_| AmountError::UnsupportedDecimals(decimals))?;
    if !formatted.contains('.') {
        return Ok(formatted);
    }
    Ok(formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string())
}
