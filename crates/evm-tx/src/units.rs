//! Decimal amount scaling
//!
//! Amounts arrive as decimal strings and are scaled by the token's own
//! decimals. Scaling itself is `alloy_primitives::utils::parse_units`; this
//! module only adds the checks the lending flows report separately.

use alloy_primitives::utils::{parse_units, ParseUnits};
use alloy_primitives::U256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitsError {
    #[error("amount is empty")]
    Empty,

    #[error("'{amount}' has more than {decimals} fractional digits")]
    TooPrecise { amount: String, decimals: u8 },

    #[error("'{amount}' is not a valid amount: {reason}")]
    Invalid { amount: String, reason: String },
}

/// Scale a decimal amount to base units: `amount * 10^decimals`.
///
/// Unlike `parse_units`, extra fractional digits are an error rather than
/// being truncated. Trailing zeros do not count.
pub fn scale_amount(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(UnitsError::Empty);
    }

    let invalid = |reason: &str| UnitsError::Invalid {
        amount: amount.to_string(),
        reason: reason.to_string(),
    };

    let (int_part, frac_part) = amount.split_once('.').unwrap_or((amount, ""));
    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !is_digits(int_part) || !is_digits(frac_part) {
        return Err(invalid("not an unsigned decimal number"));
    }
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid("no digits"));
    }

    if frac_part.trim_end_matches('0').len() > decimals as usize {
        return Err(UnitsError::TooPrecise {
            amount: amount.to_string(),
            decimals,
        });
    }

    match parse_units(amount, decimals) {
        Ok(ParseUnits::U256(value)) => Ok(value),
        Ok(ParseUnits::I256(_)) => Err(invalid("negative amount")),
        Err(e) => Err(invalid(&e.to_string())),
    }
}
