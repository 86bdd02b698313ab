//! Mock Quote Client
//!
//! For tests and offline runs. Returns static prices.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{Quote, QuoteClient};
use crate::error::{PortfolioError, Result};

/// Mock quote client with a static price table
#[derive(Default)]
pub struct MockQuoteClient {
    quotes: HashMap<String, Quote>,
    failures: HashMap<String, String>,
    calls: AtomicUsize,
}

impl MockQuoteClient {
    /// Client seeded with a handful of common tickers
    pub fn new() -> Self {
        // (symbol, price, open, high, low, volume)
        let table = [
            ("AAPL", dec!(227.50), dec!(225.10), dec!(228.90), dec!(224.30), 48_200_000),
            ("MSFT", dec!(415.20), dec!(412.00), dec!(417.75), dec!(410.60), 19_800_000),
            ("GOOGL", dec!(165.30), dec!(164.10), dec!(166.40), dec!(163.20), 22_500_000),
            ("NVDA", dec!(135.40), dec!(132.80), dec!(136.90), dec!(131.70), 210_000_000),
            ("VOO", dec!(520.10), dec!(518.40), dec!(521.30), dec!(517.20), 4_100_000),
            ("SPY", dec!(565.20), dec!(563.00), dec!(566.40), dec!(562.10), 45_000_000),
            ("BTC-USD", dec!(97500), dec!(96100), dec!(98200), dec!(95400), 25_000_000_000),
            ("ETH-USD", dec!(3450), dec!(3400), dec!(3490), dec!(3380), 15_000_000_000),
            ("GC=F", dec!(2650.40), dec!(2641.00), dec!(2658.20), dec!(2636.50), 180_000),
        ];

        let mut client = Self::empty();
        for (symbol, price, open, high, low, volume) in table {
            client = client.with_quote(Quote {
                symbol: symbol.into(),
                last_price: Some(price),
                current_price: Some(price),
                regular_market_price: Some(price),
                open: Some(open),
                day_high: Some(high),
                day_low: Some(low),
                volume: Some(volume),
            });
        }
        client
    }

    /// Client that knows no symbols
    pub fn empty() -> Self {
        Self::default()
    }

    /// Quote `symbol` at `price` on both the fast and full lookups
    #[must_use]
    pub fn with_price(self, symbol: &str, price: Decimal) -> Self {
        let mut quote = Quote::new(symbol);
        quote.last_price = Some(price);
        quote.current_price = Some(price);
        quote.regular_market_price = Some(price);
        self.with_quote(quote)
    }

    #[must_use]
    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.quotes.insert(quote.symbol.to_uppercase(), quote);
        self
    }

    /// Make every lookup of `symbol` fail with `message`
    #[must_use]
    pub fn with_failure(mut self, symbol: &str, message: &str) -> Self {
        self.failures.insert(symbol.to_uppercase(), message.to_string());
        self
    }

    /// Number of lookups served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, symbol: &str) -> Result<&Quote> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = symbol.to_uppercase();

        if let Some(message) = self.failures.get(&key) {
            return Err(PortfolioError::provider(symbol, message.clone()));
        }
        self.quotes
            .get(&key)
            .ok_or_else(|| PortfolioError::provider(symbol, "not found"))
    }
}

#[async_trait]
impl QuoteClient for MockQuoteClient {
    async fn fast_price(&self, symbol: &str) -> Result<Option<Decimal>> {
        Ok(self.lookup(symbol)?.last_price)
    }

    async fn quote(&self, symbol: &str) -> Result<Quote> {
        self.lookup(symbol).cloned()
    }

    async fn health_check(&self) -> bool {
        true // Mock always healthy
    }

    fn name(&self) -> &str {
        "MockQuotes"
    }
}
