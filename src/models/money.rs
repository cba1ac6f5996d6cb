//! Money type for representing currency amounts
//!
//! Wraps a `rust_decimal::Decimal` so that repeated conversions and equal
//! splits never accumulate binary floating-point drift. Arithmetic keeps full
//! precision; rounding to a currency's minor unit happens only when an amount
//! is presented (see [`Money::round_for`]).

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use super::currency::Currency;

/// A signed monetary amount with arbitrary decimal precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Largest amount a single record may carry (one trillion units)
    pub const MAX: Money = Money(Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0));

    /// Create a Money amount from a decimal value
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a Money amount from hundredths of a unit
    ///
    /// # Examples
    /// ```
    /// use splitshare::models::Money;
    /// let amount = Money::from_cents(1050); // 10.50
    /// assert_eq!(amount.to_string(), "10.50");
    /// ```
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Create a Money amount from whole units
    pub fn from_major(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the underlying decimal value
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Check if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Check if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Check whether the magnitude is above [`Money::MAX`]
    pub fn exceeds_limit(&self) -> bool {
        self.0.abs() > Self::MAX.0
    }

    /// Check if the amount is strictly negative
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Get the absolute value
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Divide into `parts` equal portions without rounding
    ///
    /// Returns `None` when `parts` is zero.
    pub fn divide(&self, parts: usize) -> Option<Self> {
        self.0.checked_div(Decimal::from(parts)).map(Self)
    }

    /// Clamp into the inclusive range `[low, high]`
    pub fn clamp_between(self, low: Money, high: Money) -> Self {
        if self < low {
            low
        } else if self > high {
            high
        } else {
            self
        }
    }

    /// Round to the minor-unit precision of a currency
    ///
    /// Midpoints round away from zero (2.345 USD -> 2.35, 12.5 JPY -> 13).
    pub fn round_for(&self, currency: Currency) -> Self {
        Self(self.0.round_dp_with_strategy(
            u32::from(currency.minor_units()),
            RoundingStrategy::MidpointAwayFromZero,
        ))
    }

    /// Check whether the amount rounds to zero in the given currency
    pub fn is_negligible(&self, currency: Currency) -> bool {
        self.round_for(currency).is_zero()
    }

    /// Format for display in a currency, e.g. `₹1250.00` or `-¥300`
    pub fn format_in(&self, currency: Currency) -> String {
        let rounded = self.round_for(currency);
        let digits = usize::from(currency.minor_units());
        let abs = rounded.0.abs();
        let sign = if rounded.is_negative() { "-" } else { "" };
        format!("{}{}{:.*}", sign, currency.symbol(), digits, abs)
    }

    /// Parse a money amount from a string
    ///
    /// Accepts formats: "10.50", "-10.50", "$10.50", "10", "10,5"
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let s = s.trim();
        let (negative, rest) = match s.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, s),
        };
        let rest = rest.strip_prefix('$').unwrap_or(rest).replace(',', ".");

        if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(MoneyParseError::InvalidFormat(s.to_string()));
        }

        let value = Decimal::from_str(&rest)
            .map_err(|_| MoneyParseError::InvalidFormat(s.to_string()))?;

        Ok(Self(if negative { -value } else { value }))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{:.2}", rounded)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

// Operators saturate at the Decimal range instead of panicking on overflow

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rate: Decimal) -> Self {
        Self(self.0.saturating_mul(rate))
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}
