//! Quote Provider Integration
//!
//! Abstractions and implementations for market-data sources.

mod mock;
mod yahoo;

pub use mock::MockQuoteClient;
pub use yahoo::{YahooConfig, YahooQuoteClient};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Price snapshot for one symbol as the provider reports it
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,

    /// Cheap last-trade price
    pub last_price: Option<Decimal>,

    /// Current price from the full lookup
    pub current_price: Option<Decimal>,

    /// Regular-session market price
    pub regular_market_price: Option<Decimal>,

    pub open: Option<Decimal>,
    pub day_high: Option<Decimal>,
    pub day_low: Option<Decimal>,
    pub volume: Option<u64>,
}

impl Quote {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    /// Current price, or the regular market price when the former is absent.
    /// A zero price counts as no price.
    pub fn market_price(&self) -> Option<Decimal> {
        self.current_price
            .or(self.regular_market_price)
            .filter(|p| !p.is_zero())
    }

    /// Flatten into the payload handed to the analyst
    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            symbol: self.symbol.clone(),
            current_price: self
                .current_price
                .or(self.regular_market_price)
                .unwrap_or_default(),
            open: self.open.unwrap_or_default(),
            day_high: self.day_high.unwrap_or_default(),
            day_low: self.day_low.unwrap_or_default(),
            volume: self.volume.unwrap_or_default(),
        }
    }
}

/// Market data fields embedded in analyst prompts and responses
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub symbol: String,
    pub current_price: Decimal,
    pub open: Decimal,
    pub day_high: Decimal,
    pub day_low: Decimal,
    pub volume: u64,
}

/// Quote client trait (Strategy pattern)
///
/// Implement this for each market-data source: Yahoo Finance, a broker API, etc.
#[async_trait]
pub trait QuoteClient: Send + Sync {
    /// Cheap last-price lookup. Providers without one return `Ok(None)`.
    async fn fast_price(&self, _symbol: &str) -> Result<Option<Decimal>> {
        Ok(None)
    }

    /// Full price snapshot for a symbol
    async fn quote(&self, symbol: &str) -> Result<Quote>;

    /// Check if the provider is reachable
    async fn health_check(&self) -> bool;

    /// Provider name
    fn name(&self) -> &str;
}
