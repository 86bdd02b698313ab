//! Persistence Gateway
//!
//! The hosted store is the sole authority for portfolio and holding records.
//! Everything above this trait holds only short-lived copies.

mod memory;
mod supabase;

pub use memory::MemoryStore;
pub use supabase::{SupabaseConfig, SupabaseStore};

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Holding, HoldingRecord, NewPortfolio, Portfolio, PriceUpdate};

/// Portfolio storage trait
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    /// All portfolios
    async fn list_portfolios(&self) -> Result<Vec<Portfolio>>;

    /// Insert a portfolio and return the stored row
    async fn insert_portfolio(&self, portfolio: &NewPortfolio) -> Result<Portfolio>;

    /// Holdings belonging to a portfolio, in store order
    async fn list_holdings(&self, portfolio_id: &str) -> Result<Vec<Holding>>;

    /// Insert a holding into a portfolio and return the stored row
    async fn insert_holding(&self, portfolio_id: &str, holding: &HoldingRecord) -> Result<Holding>;

    /// Replace a holding's editable fields. Unknown ids are `NotFound`.
    async fn update_holding(&self, holding_id: &str, holding: &HoldingRecord) -> Result<Holding>;

    /// Delete a holding, returning whatever rows were removed
    async fn delete_holding(&self, holding_id: &str) -> Result<Vec<Holding>>;

    /// Write the price and timestamp fields of one holding
    async fn record_price(&self, holding_id: &str, update: &PriceUpdate) -> Result<()>;

    /// Check if the store is reachable
    async fn health_check(&self) -> bool;

    /// Store name
    fn name(&self) -> &str;
}
