//! In-memory portfolio store (for development and tests)

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::PortfolioStore;
use crate::error::{PortfolioError, Result};
use crate::model::{Holding, HoldingRecord, NewPortfolio, Portfolio, PriceUpdate, RecordId};

#[derive(Default)]
struct Tables {
    portfolios: Vec<Portfolio>,
    holdings: Vec<Holding>,
}

/// Store backed by two vectors behind one lock
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current copy of one holding
    pub async fn holding(&self, holding_id: &str) -> Option<Holding> {
        let tables = self.tables.read().await;
        tables.holdings.iter().find(|h| h.id.matches(holding_id)).cloned()
    }

    /// Store a row as-is, the way another client could have written it
    #[cfg(test)]
    pub(crate) async fn seed_row(&self, row: Holding) {
        self.tables.write().await.holdings.push(row);
    }

    fn new_id() -> RecordId {
        RecordId::Text(Uuid::new_v4().to_string())
    }

    fn apply(holding: &mut Holding, record: &HoldingRecord) {
        holding.symbol.clone_from(&record.symbol);
        holding.quantity = record.quantity;
        holding.average_price = record.average_price;
        holding.asset_type = Some(record.asset_type.clone());
        holding.conviction_level.clone_from(&record.conviction_level);
        holding.investment_thesis.clone_from(&record.investment_thesis);
        holding.risks.clone_from(&record.risks);
        holding.target_value = record.target_value;
        holding.time_horizon.clone_from(&record.time_horizon);
        holding.notes.clone_from(&record.notes);
        holding.details.clone_from(&record.details);
    }
}

#[async_trait]
impl PortfolioStore for MemoryStore {
    async fn list_portfolios(&self) -> Result<Vec<Portfolio>> {
        Ok(self.tables.read().await.portfolios.clone())
    }

    async fn insert_portfolio(&self, portfolio: &NewPortfolio) -> Result<Portfolio> {
        let row = Portfolio {
            id: Self::new_id(),
            name: portfolio.name.clone(),
            user_id: portfolio.user_id.clone(),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
        };
        self.tables.write().await.portfolios.push(row.clone());
        Ok(row)
    }

    async fn list_holdings(&self, portfolio_id: &str) -> Result<Vec<Holding>> {
        let tables = self.tables.read().await;
        Ok(tables
            .holdings
            .iter()
            .filter(|h| h.portfolio_id.matches(portfolio_id))
            .cloned()
            .collect())
    }

    async fn insert_holding(&self, portfolio_id: &str, holding: &HoldingRecord) -> Result<Holding> {
        let row = Holding {
            id: Self::new_id(),
            portfolio_id: RecordId::from(portfolio_id),
            symbol: holding.symbol.clone(),
            quantity: holding.quantity,
            average_price: holding.average_price,
            asset_type: Some(holding.asset_type.clone()),
            conviction_level: holding.conviction_level.clone(),
            investment_thesis: holding.investment_thesis.clone(),
            risks: holding.risks.clone(),
            target_value: holding.target_value,
            time_horizon: holding.time_horizon.clone(),
            notes: holding.notes.clone(),
            details: holding.details.clone(),
            current_price: None,
            last_price_update: None,
            created_at: Some(chrono::Utc::now().to_rfc3339()),
        };

        self.tables.write().await.holdings.push(row.clone());
        Ok(row)
    }

    async fn update_holding(&self, holding_id: &str, holding: &HoldingRecord) -> Result<Holding> {
        let mut tables = self.tables.write().await;
        let row = tables
            .holdings
            .iter_mut()
            .find(|h| h.id.matches(holding_id))
            .ok_or_else(|| PortfolioError::NotFound(format!("holding {holding_id}")))?;

        Self::apply(row, holding);
        Ok(row.clone())
    }

    async fn delete_holding(&self, holding_id: &str) -> Result<Vec<Holding>> {
        let mut tables = self.tables.write().await;
        let (removed, kept): (Vec<Holding>, Vec<Holding>) = std::mem::take(&mut tables.holdings)
            .into_iter()
            .partition(|h| h.id.matches(holding_id));
        tables.holdings = kept;
        Ok(removed)
    }

    async fn record_price(&self, holding_id: &str, update: &PriceUpdate) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(row) = tables.holdings.iter_mut().find(|h| h.id.matches(holding_id)) {
            row.current_price = Some(update.current_price);
            row.last_price_update = Some(update.last_price_update.to_rfc3339());
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "Memory"
    }
}
