//! # portfolio-tracker
//!
//! Investment portfolio tracking: holdings CRUD against a hosted store,
//! batch price refresh from a quote provider, and LLM market commentary.
//!
//! ## Price refresh
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  POST /portfolio/{id}/refresh-prices                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  AAPL     STOCK   fast price 150.00  → written      updated  │
//! │  BTC-USD  CRYPTO  provider error     → collected    errors   │
//! │  XYZ      BOND    no ticker          → untouched    skipped  │
//! └──────────────────────────────────────────────────────────────┘
//!   → {"updated": 1, "errors": ["Failed BTC-USD: not found"]}
//! ```
//!
//! One bad ticker never blocks the rest of the portfolio.

pub mod error;
pub mod model;
pub mod quote;
pub mod store;
pub mod svckit;

pub use error::{PortfolioError, Result};
pub use model::{AssetType, Holding, HoldingRequest, Portfolio, PortfolioValuation, RefreshResult};
pub use quote::{MockQuoteClient, QuoteClient, YahooQuoteClient};
pub use store::{MemoryStore, PortfolioStore, SupabaseStore};
pub use svckit::{MarketAnalyst, OwnerPolicy, PortfolioManager, PortfolioService, PriceRefresher};

/// System prompt for the market analyst agent
pub const MARKET_ANALYST_PROMPT: &str = "You are a financial market analyst. Analyze the provided stock data and give a short trend summary (Bullish/Bearish/Neutral) and key levels to watch.";
