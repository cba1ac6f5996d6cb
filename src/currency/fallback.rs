//! Built-in exchange rate table
//!
//! Quotes are expressed as units of a currency per 1 USD. The table is always
//! available, so conversion never depends on the network.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::Rates;
use crate::models::Currency;

/// Static USD-pivot quotes used whenever no fresh live quote exists
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackRates {
    quotes: HashMap<Currency, Decimal>,
}

impl FallbackRates {
    /// The built-in table
    pub fn builtin() -> Self {
        let quotes = [
            (Currency::Usd, Decimal::ONE),
            (Currency::Eur, Decimal::new(92, 2)),
            (Currency::Gbp, Decimal::new(79, 2)),
            (Currency::Inr, Decimal::new(83, 0)),
            (Currency::Jpy, Decimal::new(150, 0)),
            (Currency::Krw, Decimal::new(1330, 0)),
            (Currency::Cad, Decimal::new(136, 2)),
            (Currency::Aud, Decimal::new(152, 2)),
            (Currency::Cny, Decimal::new(72, 1)),
            (Currency::Chf, Decimal::new(88, 2)),
            (Currency::Sgd, Decimal::new(134, 2)),
            (Currency::Aed, Decimal::new(36725, 4)),
            (Currency::Mxn, Decimal::new(17, 0)),
            (Currency::Brl, Decimal::new(5, 0)),
        ];
        Self {
            quotes: quotes.into_iter().collect(),
        }
    }

    /// Units of `currency` per 1 USD
    pub fn quote(&self, currency: Currency) -> Decimal {
        self.quotes.get(&currency).copied().unwrap_or(Decimal::ONE)
    }

    /// Replace one entry of the table
    ///
    /// Non-positive quotes are ignored.
    pub fn set_quote(&mut self, currency: Currency, quote: Decimal) {
        if quote > Decimal::ZERO {
            self.quotes.insert(currency, quote);
        }
    }
}

impl Default for FallbackRates {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Rates for FallbackRates {
    fn rate(&self, from: Currency, to: Currency) -> Decimal {
        if from == to {
            return Decimal::ONE;
        }
        self.quote(to)
            .checked_div(self.quote(from))
            .unwrap_or(Decimal::ONE)
    }
}
