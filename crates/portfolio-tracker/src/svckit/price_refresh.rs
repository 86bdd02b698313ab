//! Price Refresh
//!
//! Batch enrichment of a portfolio's holdings with fresh market prices.
//! One bad ticker never blocks the rest of the portfolio: per-holding
//! failures are collected into the report, and only the initial holdings
//! fetch can fail the whole run.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::error::Result;
use crate::model::{Holding, PriceUpdate, RefreshResult};
use crate::quote::QuoteClient;
use crate::store::PortfolioStore;

/// What happened to one holding during a refresh pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    /// Asset type has no ticker, or the symbol is empty
    Skipped,
    /// Price written back to the store
    Updated(Decimal),
    /// Provider answered but had no usable price
    NoPrice,
    /// Lookup or write failed with this message
    Failed(String),
}

/// Refreshes holding prices from a quote provider
pub struct PriceRefresher {
    store: Arc<dyn PortfolioStore>,
    quotes: Arc<dyn QuoteClient>,
}

impl PriceRefresher {
    pub fn new(store: Arc<dyn PortfolioStore>, quotes: Arc<dyn QuoteClient>) -> Self {
        Self { store, quotes }
    }

    /// Refresh every eligible holding of a portfolio, one at a time.
    pub async fn refresh(&self, portfolio_id: &str) -> Result<RefreshResult> {
        let holdings = self.store.list_holdings(portfolio_id).await?;
        tracing::debug!(portfolio_id, holdings = holdings.len(), "refreshing prices");

        let mut result = RefreshResult::default();

        for holding in &holdings {
            match self.enrich(holding).await {
                EnrichmentOutcome::Skipped => result.skipped += 1,
                EnrichmentOutcome::Updated(price) => {
                    tracing::debug!(symbol = %holding.symbol, %price, "price updated");
                    result.updated += 1;
                }
                EnrichmentOutcome::NoPrice => {
                    tracing::debug!(symbol = %holding.symbol, "no price available");
                    result.unpriced += 1;
                }
                EnrichmentOutcome::Failed(message) => {
                    tracing::warn!(symbol = %holding.symbol, "price refresh failed: {}", message);
                    result.errors.push(format!("Failed {}: {}", holding.symbol, message));
                }
            }
        }

        tracing::info!(
            portfolio_id,
            updated = result.updated,
            failed = result.errors.len(),
            skipped = result.skipped,
            "price refresh complete"
        );
        Ok(result)
    }

    /// Look up and persist the price of one holding
    pub async fn enrich(&self, holding: &Holding) -> EnrichmentOutcome {
        if !holding.is_price_eligible() {
            return EnrichmentOutcome::Skipped;
        }

        let price = match self.resolve_price(&holding.symbol).await {
            Ok(Some(price)) => price,
            Ok(None) => return EnrichmentOutcome::NoPrice,
            Err(e) => return EnrichmentOutcome::Failed(e.message()),
        };

        let update = PriceUpdate::now(price);
        match self.store.record_price(&holding.id.to_string(), &update).await {
            Ok(()) => EnrichmentOutcome::Updated(price),
            Err(e) => EnrichmentOutcome::Failed(e.message()),
        }
    }

    /// Fast last-price field first, then the full quote.
    /// Zero counts as no price on both paths.
    async fn resolve_price(&self, symbol: &str) -> Result<Option<Decimal>> {
        if let Some(price) = self.quotes.fast_price(symbol).await?.filter(|p| !p.is_zero()) {
            return Ok(Some(price));
        }

        let quote = self.quotes.quote(symbol).await?;
        Ok(quote.market_price())
    }
}
