pub mod serde_helpers;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,
    #[error("Invalid amount '{0}'")]
    Invalid(String),
    #[error("Amount '{value}' has more than {decimals} decimals")]
    TooManyDecimals { value: String, decimals: u8 },
    #[error("Amount '{0}' overflows")]
    Overflow(String),
}

// Format an atomic value to a human readable amount, trailing zeros are trimmed
// format_coin(100_000_000, 9) == "0.1"
pub fn format_coin(value: u64, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }

    let unit = 10u64.pow(decimals as u32);
    let integer = value / unit;
    let fraction = value % unit;
    if fraction == 0 {
        return integer.to_string();
    }

    let fraction = format!("{:0width$}", fraction, width = decimals as usize);
    format!("{}.{}", integer, fraction.trim_end_matches('0'))
}

// Parse a human readable amount to its atomic value without going through floats
// from_coin("0.1", 9) == Ok(100_000_000)
pub fn from_coin<S: AsRef<str>>(value: S, decimals: u8) -> Result<u64, AmountError> {
    let value = value.as_ref().trim();
    if value.is_empty() {
        return Err(AmountError::Empty);
    }

    let (integer, fraction) = match value.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (value, ""),
    };

    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (integer.is_empty() && fraction.is_empty()) || !is_digits(integer) || !is_digits(fraction)
    {
        return Err(AmountError::Invalid(value.to_owned()));
    }

    if fraction.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals {
            value: value.to_owned(),
            decimals,
        });
    }

    let overflow = || AmountError::Overflow(value.to_owned());
    let unit = 10u64
        .checked_pow(decimals as u32)
        .ok_or_else(overflow)?;

    let integer: u64 = if integer.is_empty() {
        0
    } else {
        integer.parse().map_err(|_| overflow())?
    };

    let fraction: u64 = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = decimals as usize);
        padded.parse().map_err(|_| overflow())?
    };

    integer
        .checked_mul(unit)
        .and_then(|v| v.checked_add(fraction))
        .ok_or_else(overflow)
}
