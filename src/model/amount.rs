//! Amount type for handling monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that may
//! or may not include a currency symbol and thousands separators. Arithmetic is exact; rounding to
//! two decimal places only happens when an amount is displayed.

use crate::error::Res;
use anyhow::{bail, Context};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// Represents a monetary amount.
///
/// # Examples
///
/// ```
/// # use salesboard::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("$1,250.5").unwrap();
/// assert_eq!(a.to_string(), "1,250.50");
/// assert_eq!(a.with_symbol("$"), "$1,250.50");
///
/// let b = Amount::from_str("-40").unwrap();
/// assert_eq!(b.with_symbol("R$"), "-R$40.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// The value rounded to cents, halves away from zero.
    pub fn rounded(&self) -> Decimal {
        to_cents(self.0)
    }

    /// Lossy conversion for chart data.
    pub fn to_f64(&self) -> f64 {
        self.rounded().to_f64().unwrap_or_default()
    }

    /// Divides by `count`, returning zero when `count` is zero.
    pub fn average(&self, count: usize) -> Amount {
        if count == 0 {
            return Amount::ZERO;
        }
        Amount(self.0 / Decimal::from(count))
    }

    /// Formats the amount with a currency symbol placed after the sign, e.g. `-$60,000.00`.
    pub fn with_symbol(&self, symbol: &str) -> String {
        let sign = if self.rounded().is_sign_negative() && !self.rounded().is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}{symbol}{}", format_abs(self.0))
    }

    /// Reads an amount from a document field, which may be a JSON number or a string.
    pub(crate) fn from_json(value: &Value) -> Res<Self> {
        match value {
            Value::Number(n) => parse_number(&n.to_string()),
            Value::String(s) => Amount::from_str(s).map_err(anyhow::Error::from),
            other => bail!("Expected a number or a string for an amount but found {other}"),
        }
    }
}

fn parse_number(s: &str) -> Res<Amount> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map(Amount)
        .with_context(|| format!("Unable to read '{s}' as an amount"))
}

fn to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn format_abs(value: Decimal) -> String {
    let abs = to_cents(value.abs());
    format_num::format_num!(",.2", abs.to_f64().unwrap_or_default())
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(String);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError("An empty string is not an amount".to_string()));
        }

        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(after_minus) => (true, after_minus),
            None => (false, trimmed),
        };

        // Skip a currency symbol such as "$" or "R$"
        let digits = rest
            .trim_start_matches(|c: char| !c.is_ascii_digit() && c != '.')
            .trim();
        let without_commas = digits.replace(',', "");

        let value = Decimal::from_str(&without_commas)
            .map_err(|e| AmountError(format!("Unable to read '{s}' as an amount: {e}")))?;
        Ok(Amount(if negative { -value } else { value }))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.with_symbol(""))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:.2}", self.rounded()))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Amount::from_json(&value).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        assert_eq!(Amount::from_str("50.00").unwrap().value(), dec("50"));
    }

    #[test]
    fn test_parse_with_symbol_and_commas() {
        assert_eq!(
            Amount::from_str("$1,234,567.89").unwrap().value(),
            dec("1234567.89")
        );
        assert_eq!(Amount::from_str("R$ 12.5").unwrap().value(), dec("12.5"));
    }

    #[test]
    fn test_parse_negative_with_symbol() {
        assert_eq!(Amount::from_str("-$60,000.00").unwrap().value(), dec("-60000"));
    }

    #[test]
    fn test_parse_whitespace() {
        assert_eq!(Amount::from_str("  $50.00  ").unwrap().value(), dec("50"));
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!(Amount::from_str("   ").is_err());
        assert!(Amount::from_str("abc").is_err());
    }

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Amount::new(dec("33.333333")).to_string(), "33.33");
        assert_eq!(Amount::new(dec("1000")).to_string(), "1,000.00");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_halves_round_away_from_zero() {
        assert_eq!(Amount::new(dec("0.125")).with_symbol("$"), "$0.13");
        assert_eq!(Amount::new(dec("0.025")).rounded(), dec("0.03"));
        assert_eq!(Amount::new(dec("-0.125")).with_symbol("$"), "-$0.13");
    }

    #[test]
    fn test_with_symbol_negative() {
        assert_eq!(Amount::new(dec("-12.5")).with_symbol("$"), "-$12.50");
    }

    #[test]
    fn test_with_symbol_tiny_negative_rounds_to_zero() {
        assert_eq!(Amount::new(dec("-0.001")).with_symbol("$"), "$0.00");
    }

    #[test]
    fn test_average() {
        assert_eq!(Amount::new(dec("100")).average(4).value(), dec("25"));
        assert_eq!(Amount::new(dec("100")).average(0), Amount::ZERO);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Amount::from_json(&json!(19.99)).unwrap().value(), dec("19.99"));
        assert_eq!(Amount::from_json(&json!(100)).unwrap().value(), dec("100"));
        assert_eq!(Amount::from_json(&json!("$7.25")).unwrap().value(), dec("7.25"));
        assert!(Amount::from_json(&json!(null)).is_err());
        assert!(Amount::from_json(&json!(true)).is_err());
    }

    #[test]
    fn test_serialize_as_cents_string() {
        let json = serde_json::to_string(&Amount::new(dec("1234.5"))).unwrap();
        assert_eq!(json, "\"1234.50\"");
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let a: Amount = serde_json::from_str("\"-$5,000.00\"").unwrap();
        assert_eq!(a.value(), dec("-5000"));
        let b: Amount = serde_json::from_str("42.1").unwrap();
        assert_eq!(b.value(), dec("42.1"));
    }

    #[test]
    fn test_sum_is_exact() {
        let parts = [dec("0.1"), dec("0.2"), dec("0.3")];
        let total: Amount = parts.iter().map(|d| Amount::new(*d)).sum();
        assert_eq!(total.value(), dec("0.6"));
    }
}
