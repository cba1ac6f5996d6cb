//! Currency conversion for SplitShare
//!
//! Converts amounts between supported currencies with a three-tier lookup:
//!
//! - a fresh live quote from the TTL cache,
//! - otherwise the built-in `FallbackRates` table,
//! - and, for records carrying a locked exchange rate, that locked rate.
//!
//! Live fetching goes through the `RateSource` trait and never surfaces an
//! error to callers; failures are logged and the fallback table is used.
//!
//! # Example
//!
//! ```rust,ignore
//! use splitshare::currency::{CurrencyConverter, Rates};
//!
//! let converter = CurrencyConverter::new();
//! let usd = converter.convert(Money::from_major(830), Currency::Inr, Currency::Usd);
//! ```

mod converter;
mod fallback;
mod source;

pub use converter::{CurrencyConverter, PricedRecord, RateStatus};
pub use fallback::FallbackRates;
pub use source::{HttpRateSource, RateFetchError, RateSource};

use rust_decimal::Decimal;

use crate::models::{Currency, Money};

/// Anything that can answer "how many `to` per one `from`"
pub trait Rates {
    /// Conversion factor from `from` to `to`; exactly 1 for equal currencies
    fn rate(&self, from: Currency, to: Currency) -> Decimal;

    /// Convert an amount without rounding
    fn convert(&self, amount: Money, from: Currency, to: Currency) -> Money {
        if from == to {
            amount
        } else {
            amount * self.rate(from, to)
        }
    }
}
