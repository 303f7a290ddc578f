//! Human-readable reward amounts.
//!
//! [`MoneyAmount`] parses strings such as `"1.0"` or `"$1,000.50"` into a precise decimal
//! that keeps the scale it was written with, so `"1.0"` is shown back as `"1.0"`.
//! [`Reward`] pairs an amount with its unit label, e.g. `1.0 PRP`.
//!
//! ```rust
//! use x402_claim_types::MoneyAmount;
//!
//! let amount = MoneyAmount::parse("1.0").unwrap();
//! assert_eq!(amount.to_string(), "1.0");
//! assert_eq!(amount.as_base_units(18).unwrap(), 1_000_000_000_000_000_000);
//! ```

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;

/// A parsed non-negative decimal amount.
#[derive(Debug, Clone, PartialEq)]
pub struct MoneyAmount(pub Decimal);

/// Errors that can occur when parsing or converting an amount.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MoneyAmountParseError {
    #[error("Invalid number format")]
    InvalidFormat,
    #[error(
        "Amount must be between {} and {}",
        constants::MIN_STR,
        constants::MAX_STR
    )]
    OutOfRange,
    #[error("Negative value is not allowed")]
    Negative,
    #[error("Too big of a precision: {money} vs {token} on token")]
    WrongPrecision { money: u32, token: u32 },
}

mod constants {
    use super::*;

    pub const MIN_STR: &str = "0.000000001";
    pub const MAX_STR: &str = "999999999";

    pub static MIN: LazyLock<Decimal> =
        LazyLock::new(|| Decimal::from_str(MIN_STR).expect("valid decimal"));
    pub static MAX: LazyLock<Decimal> =
        LazyLock::new(|| Decimal::from_str(MAX_STR).expect("valid decimal"));
    pub static NOISE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\d\.\-]+").expect("valid regex"));
}

impl MoneyAmount {
    /// `1.0`, written with one decimal place.
    pub const fn one() -> Self {
        MoneyAmount(Decimal::from_parts(10, 0, 0, false, 1))
    }

    /// Parses a human-readable amount.
    ///
    /// Currency symbols, thousand separators and whitespace are stripped first.
    pub fn parse(input: &str) -> Result<Self, MoneyAmountParseError> {
        let cleaned = constants::NOISE.replace_all(input, "");
        let parsed =
            Decimal::from_str(&cleaned).map_err(|_| MoneyAmountParseError::InvalidFormat)?;
        if parsed.is_sign_negative() {
            return Err(MoneyAmountParseError::Negative);
        }
        if parsed < *constants::MIN || parsed > *constants::MAX {
            return Err(MoneyAmountParseError::OutOfRange);
        }
        Ok(MoneyAmount(parsed))
    }

    /// Number of decimal places as written.
    pub fn scale(&self) -> u32 {
        self.0.scale()
    }

    /// The value without its decimal point, e.g. `"12.34"` is `1234`.
    pub fn mantissa(&self) -> u128 {
        self.0.mantissa().unsigned_abs()
    }

    /// Converts into integer base units of a token with `decimals` decimal places.
    pub fn as_base_units(&self, decimals: u32) -> Result<u128, MoneyAmountParseError> {
        let normalized = self.0.normalize();
        let scale = normalized.scale();
        if scale > decimals {
            return Err(MoneyAmountParseError::WrongPrecision {
                money: scale,
                token: decimals,
            });
        }
        let mantissa = normalized.mantissa().unsigned_abs();
        10u128
            .checked_pow(decimals - scale)
            .and_then(|factor| mantissa.checked_mul(factor))
            .ok_or(MoneyAmountParseError::OutOfRange)
    }
}

impl FromStr for MoneyAmount {
    type Err = MoneyAmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoneyAmount::parse(s)
    }
}

impl TryFrom<&str> for MoneyAmount {
    type Error = MoneyAmountParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        MoneyAmount::from_str(value)
    }
}

impl Display for MoneyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for MoneyAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MoneyAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        MoneyAmount::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// An amount and the unit it is paid in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub amount: MoneyAmount,
    pub unit: String,
}

impl Reward {
    pub const DEFAULT_UNIT: &'static str = "PRP";
}

impl Default for Reward {
    fn default() -> Self {
        Self {
            amount: MoneyAmount::one(),
            unit: Self::DEFAULT_UNIT.to_string(),
        }
    }
}

impl Display for Reward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit)
    }
}
