//! The currency converter
//!
//! Reads never block and never fail: `rate` answers from the live cache while
//! it is fresh and from the fallback table otherwise. `refresh` is the only
//! operation that touches the network; its result only affects later reads.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::fallback::FallbackRates;
use super::source::{HttpRateSource, RateSource};
use super::Rates;
use crate::config::settings::RateSettings;
use crate::models::{Currency, Expense, Money, PersonalExpense};

/// Default lifetime of live quotes
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Default limit on a live fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a live refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateStatus {
    /// Fresh live quotes are cached
    Live,
    /// The fetch failed, timed out or no source is configured
    Degraded,
}

/// A record that may carry its own frozen exchange rate
pub trait PricedRecord {
    fn amount(&self) -> Money;
    fn currency(&self) -> Currency;

    /// Units of `currency()` per 1 USD captured when the record was created
    fn locked_rate(&self) -> Option<Decimal> {
        None
    }
}

impl PricedRecord for PersonalExpense {
    fn amount(&self) -> Money {
        self.amount
    }

    fn currency(&self) -> Currency {
        self.currency
    }

    fn locked_rate(&self) -> Option<Decimal> {
        self.locked_exchange_rate()
    }
}

impl PricedRecord for Expense {
    fn amount(&self) -> Money {
        self.amount
    }

    fn currency(&self) -> Currency {
        self.currency
    }
}

#[derive(Debug, Clone)]
struct CachedQuotes {
    quotes: HashMap<Currency, Decimal>,
    fetched_at: Instant,
}

/// Converts amounts between currencies with caching and graceful fallback
pub struct CurrencyConverter {
    fallback: RwLock<FallbackRates>,
    cache: RwLock<Option<CachedQuotes>>,
    source: Option<Arc<dyn RateSource>>,
    ttl: Duration,
    timeout: Duration,
}

impl CurrencyConverter {
    /// A converter backed only by the built-in table
    pub fn new() -> Self {
        Self {
            fallback: RwLock::new(FallbackRates::builtin()),
            cache: RwLock::new(None),
            source: None,
            ttl: DEFAULT_CACHE_TTL,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Build a converter from rate settings
    pub fn from_settings(settings: &RateSettings) -> Self {
        let converter = Self::new()
            .with_ttl(Duration::from_secs(settings.cache_ttl_secs))
            .with_timeout(Duration::from_secs(settings.timeout_secs));

        match (&settings.api_url, settings.enabled) {
            (Some(url), true) => converter.with_source(Arc::new(HttpRateSource::new(url.clone()))),
            _ => converter,
        }
    }

    /// Attach a live rate source (builder style)
    pub fn with_source(mut self, source: Arc<dyn RateSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set how long live quotes stay fresh (builder style)
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the live fetch timeout (builder style)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace one entry of the fallback table
    pub fn set_fallback_quote(&self, currency: Currency, quote: Decimal) {
        self.fallback
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_quote(currency, quote);
    }

    /// Whether live quotes are cached and younger than the TTL
    pub fn is_fresh(&self) -> bool {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|cached| cached.fetched_at.elapsed() < self.ttl)
    }

    /// Units of `currency` per 1 USD from the freshest available tier
    fn quote(&self, currency: Currency) -> Decimal {
        if currency == Currency::Usd {
            return Decimal::ONE;
        }

        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                if let Some(quote) = cached.quotes.get(&currency) {
                    debug!(currency = %currency, "using cached live quote");
                    return *quote;
                }
            }
        }
        drop(cache);

        debug!(currency = %currency, "using fallback quote");
        self.fallback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .quote(currency)
    }

    /// Fetch live quotes and cache them
    ///
    /// Never fails: errors and timeouts are logged and reported as
    /// `RateStatus::Degraded`, leaving earlier cache contents in place.
    pub async fn refresh(&self) -> RateStatus {
        let Some(source) = self.source.as_ref() else {
            debug!("no live rate source configured");
            return RateStatus::Degraded;
        };

        match tokio::time::timeout(self.timeout, source.fetch_quotes()).await {
            Ok(Ok(quotes)) => {
                info!(count = quotes.len(), "refreshed live exchange rates");
                *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(CachedQuotes {
                    quotes,
                    fetched_at: Instant::now(),
                });
                RateStatus::Live
            }
            Ok(Err(err)) => {
                warn!(error = %err, "live rate fetch failed, using fallback table");
                RateStatus::Degraded
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "live rate fetch timed out, using fallback table");
                RateStatus::Degraded
            }
        }
    }

    /// Like `rate`, but refreshes first when the cache is stale
    pub async fn rate_or_fetch(&self, from: Currency, to: Currency) -> Decimal {
        if from == to {
            return Decimal::ONE;
        }
        if !self.is_fresh() {
            self.refresh().await;
        }
        self.rate(from, to)
    }

    /// Units of the record's currency per 1 USD
    ///
    /// A locked rate wins unconditionally over cached and fallback quotes.
    pub fn effective_rate<R: PricedRecord + ?Sized>(&self, record: &R) -> Decimal {
        match record.locked_rate() {
            Some(locked) => locked,
            None => self.rate(Currency::Usd, record.currency()),
        }
    }

    /// Convert a record's amount, honouring its locked rate
    pub fn convert_record<R: PricedRecord + ?Sized>(&self, record: &R, to: Currency) -> Money {
        if record.locked_rate().is_none() {
            return self.convert(record.amount(), record.currency(), to);
        }

        let usd = record
            .amount()
            .amount()
            .checked_div(self.effective_rate(record))
            .map(Money::new)
            .unwrap_or_else(|| self.convert(record.amount(), record.currency(), Currency::Usd));
        self.convert(usd, Currency::Usd, to)
    }
}

impl Default for CurrencyConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Rates for CurrencyConverter {
    fn rate(&self, from: Currency, to: Currency) -> Decimal {
        if from == to {
            return Decimal::ONE;
        }
        self.quote(to)
            .checked_div(self.quote(from))
            .unwrap_or(Decimal::ONE)
    }
}

impl std::fmt::Debug for CurrencyConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrencyConverter")
            .field("has_source", &self.source.is_some())
            .field("ttl", &self.ttl)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::RateFetchError;
    use crate::models::{CurrencyContext, EntryKind, UserId};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSource {
        quotes: HashMap<Currency, Decimal>,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn inr(quote: i64) -> Arc<Self> {
            Arc::new(Self {
                quotes: [(Currency::Usd, Decimal::ONE), (Currency::Inr, Decimal::from(quote))]
                    .into_iter()
                    .collect(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RateSource for FixedSource {
        async fn fetch_quotes(&self) -> Result<HashMap<Currency, Decimal>, RateFetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.quotes.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl RateSource for FailingSource {
        async fn fetch_quotes(&self) -> Result<HashMap<Currency, Decimal>, RateFetchError> {
            Err(RateFetchError::Http("network unreachable".into()))
        }
    }

    struct SlowSource;

    #[async_trait]
    impl RateSource for SlowSource {
        async fn fetch_quotes(&self) -> Result<HashMap<Currency, Decimal>, RateFetchError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(HashMap::new())
        }
    }

    fn inr_record(amount: i64) -> PersonalExpense {
        PersonalExpense::new(
            UserId::new(),
            Money::from_major(amount),
            EntryKind::Expense,
            CurrencyContext::new(Currency::Inr, Currency::Usd),
            true,
            NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
        )
    }

    #[test]
    fn test_same_currency_is_one() {
        let converter = CurrencyConverter::new();
        assert_eq!(converter.rate(Currency::Jpy, Currency::Jpy), Decimal::ONE);
        assert_eq!(
            converter.convert(Money::from_major(12), Currency::Eur, Currency::Eur),
            Money::from_major(12)
        );
    }

    #[test]
    fn test_without_network_uses_fallback() {
        let converter = CurrencyConverter::new();
        assert_eq!(converter.rate(Currency::Usd, Currency::Inr), Decimal::from(83));
        let first = converter.convert(Money::from_major(10), Currency::Eur, Currency::Gbp);
        let second = converter.convert(Money::from_major(10), Currency::Eur, Currency::Gbp);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_refresh_without_source_is_degraded() {
        let converter = CurrencyConverter::new();
        assert_eq!(converter.refresh().await, RateStatus::Degraded);
        assert_eq!(converter.rate(Currency::Usd, Currency::Inr), Decimal::from(83));
    }

    #[tokio::test]
    async fn test_live_quotes_affect_subsequent_reads() {
        let converter = CurrencyConverter::new().with_source(FixedSource::inr(80));
        assert_eq!(converter.rate(Currency::Usd, Currency::Inr), Decimal::from(83));

        assert_eq!(converter.refresh().await, RateStatus::Live);
        assert!(converter.is_fresh());
        assert_eq!(converter.rate(Currency::Usd, Currency::Inr), Decimal::from(80));
        // Currencies the source did not quote still come from the table
        assert_eq!(converter.rate(Currency::Usd, Currency::Jpy), Decimal::from(150));
    }

    #[tokio::test]
    async fn test_failed_fetch_degrades_silently() {
        let converter = CurrencyConverter::new().with_source(Arc::new(FailingSource));
        assert_eq!(converter.refresh().await, RateStatus::Degraded);
        assert_eq!(
            converter.rate_or_fetch(Currency::Usd, Currency::Inr).await,
            Decimal::from(83)
        );
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let converter = CurrencyConverter::new()
            .with_source(Arc::new(SlowSource))
            .with_timeout(Duration::from_millis(20));
        assert_eq!(converter.refresh().await, RateStatus::Degraded);
        assert_eq!(converter.rate(Currency::Usd, Currency::Inr), Decimal::from(83));
    }

    #[tokio::test]
    async fn test_expired_cache_is_ignored() {
        let converter = CurrencyConverter::new()
            .with_source(FixedSource::inr(80))
            .with_ttl(Duration::ZERO);
        converter.refresh().await;
        assert!(!converter.is_fresh());
        assert_eq!(converter.rate(Currency::Usd, Currency::Inr), Decimal::from(83));
    }

    #[tokio::test]
    async fn test_rate_or_fetch_only_fetches_when_stale() {
        let source = FixedSource::inr(80);
        let converter = CurrencyConverter::new().with_source(source.clone());

        converter.rate_or_fetch(Currency::Usd, Currency::Inr).await;
        converter.rate_or_fetch(Currency::Usd, Currency::Inr).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_effective_rate_prefers_locked_rate() {
        let converter = CurrencyConverter::new();
        let mut record = inr_record(7500);
        assert_eq!(converter.effective_rate(&record), Decimal::from(83));

        record.lock_exchange_rate(Decimal::from(75));
        assert_eq!(converter.effective_rate(&record), Decimal::from(75));
    }

    #[tokio::test]
    async fn test_locked_rate_survives_table_and_live_updates() {
        let converter = CurrencyConverter::new().with_source(FixedSource::inr(90));
        let mut record = inr_record(7500);
        record.lock_exchange_rate(Decimal::from(75));

        converter.set_fallback_quote(Currency::Inr, Decimal::from(83));
        converter.refresh().await;

        assert_eq!(converter.effective_rate(&record), Decimal::from(75));
        assert_eq!(
            converter.convert_record(&record, Currency::Usd),
            Money::from_major(100)
        );
    }

    #[test]
    fn test_unlocked_record_follows_table() {
        let converter = CurrencyConverter::new();
        let record = inr_record(830);
        assert_eq!(
            converter.convert_record(&record, Currency::Usd).round_for(Currency::Usd),
            Money::from_major(10)
        );

        converter.set_fallback_quote(Currency::Inr, Decimal::from(83) * Decimal::from(2));
        assert_eq!(
            converter.convert_record(&record, Currency::Usd).round_for(Currency::Usd),
            Money::from_major(5)
        );
    }
}
