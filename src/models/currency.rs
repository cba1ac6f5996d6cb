//! Currency codes accepted by the ledger
//!
//! Currency is a closed set: codes outside it are rejected when an expense or
//! settlement is created, so unknown codes never reach balance math.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ISO 4217 currency code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Inr,
    Jpy,
    Krw,
    Cad,
    Aud,
    Cny,
    Chf,
    Sgd,
    Aed,
    Mxn,
    Brl,
}

impl Currency {
    /// Every supported currency
    pub const ALL: [Currency; 14] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Inr,
        Currency::Jpy,
        Currency::Krw,
        Currency::Cad,
        Currency::Aud,
        Currency::Cny,
        Currency::Chf,
        Currency::Sgd,
        Currency::Aed,
        Currency::Mxn,
        Currency::Brl,
    ];

    /// Canonical three-letter code
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Inr => "INR",
            Currency::Jpy => "JPY",
            Currency::Krw => "KRW",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Cny => "CNY",
            Currency::Chf => "CHF",
            Currency::Sgd => "SGD",
            Currency::Aed => "AED",
            Currency::Mxn => "MXN",
            Currency::Brl => "BRL",
        }
    }

    /// Number of fraction digits shown for this currency
    ///
    /// JPY and KRW have no minor unit.
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Jpy | Currency::Krw => 0,
            _ => 2,
        }
    }

    /// Display symbol
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Inr => "₹",
            Currency::Jpy => "¥",
            Currency::Krw => "₩",
            Currency::Cad => "C$",
            Currency::Aud => "A$",
            Currency::Cny => "CN¥",
            Currency::Chf => "CHF ",
            Currency::Sgd => "S$",
            Currency::Aed => "AED ",
            Currency::Mxn => "MX$",
            Currency::Brl => "R$",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or(UnknownCurrency(code))
    }
}

/// Error returned for codes outside the supported set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCurrency(pub String);

impl fmt::Display for UnknownCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown currency code: '{}'", self.0)
    }
}

impl std::error::Error for UnknownCurrency {}
