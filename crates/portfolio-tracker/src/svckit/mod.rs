//! Service Kit
//!
//! Portfolio services and agents built on the store, quote and LLM seams.

mod market_analyst;
mod portfolio_manager;
mod portfolio_service;
mod price_refresh;

pub use market_analyst::{MarketAnalysis, MarketAnalyst};
pub use portfolio_manager::{PortfolioItem, PortfolioManager, PortfolioSummary, Recommendation};
pub use portfolio_service::{OwnerPolicy, PortfolioService};
pub use price_refresh::{EnrichmentOutcome, PriceRefresher};
