//! Portfolio Service
//!
//! CRUD over portfolios and holdings. Request bodies are normalized here so
//! every store sees upper-case symbols and asset types.

use std::sync::Arc;

use crate::error::{PortfolioError, Result};
use crate::model::{
    Holding, HoldingRequest, NewPortfolio, Portfolio, PortfolioValuation, DEFAULT_PORTFOLIO_NAME,
    PLACEHOLDER_OWNER_ID,
};
use crate::store::PortfolioStore;

/// How a new portfolio is attributed to an owner when no auth context exists
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OwnerPolicy {
    /// Always send this owner id
    Placeholder(String),
    /// Never send an owner id
    Omit,
    /// Send this owner id; if the store rejects the insert, retry without it
    PlaceholderWithFallback(String),
}

impl Default for OwnerPolicy {
    fn default() -> Self {
        Self::PlaceholderWithFallback(PLACEHOLDER_OWNER_ID.to_string())
    }
}

impl OwnerPolicy {
    /// Build from a mode name (`placeholder`, `omit`, `fallback`) and an optional owner id
    pub fn from_mode(mode: &str, owner_id: Option<String>) -> Result<Self> {
        let owner_id = owner_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_OWNER_ID.to_string());

        match mode.trim().to_lowercase().as_str() {
            "placeholder" => Ok(Self::Placeholder(owner_id)),
            "omit" => Ok(Self::Omit),
            "fallback" | "" => Ok(Self::PlaceholderWithFallback(owner_id)),
            other => Err(PortfolioError::Config(format!(
                "unknown PORTFOLIO_OWNER_MODE '{other}' (expected placeholder, omit or fallback)"
            ))),
        }
    }

    /// Read `PORTFOLIO_OWNER_MODE` and `PORTFOLIO_OWNER_ID`
    pub fn from_env() -> Result<Self> {
        let mode = std::env::var("PORTFOLIO_OWNER_MODE").unwrap_or_else(|_| "fallback".into());
        Self::from_mode(&mode, std::env::var("PORTFOLIO_OWNER_ID").ok())
    }
}

pub struct PortfolioService {
    store: Arc<dyn PortfolioStore>,
    owner_policy: OwnerPolicy,
}

impl PortfolioService {
    pub fn new(store: Arc<dyn PortfolioStore>, owner_policy: OwnerPolicy) -> Self {
        Self {
            store,
            owner_policy,
        }
    }

    pub async fn list_portfolios(&self) -> Result<Vec<Portfolio>> {
        self.store.list_portfolios().await
    }

    /// Create a portfolio, attributing it according to the owner policy
    pub async fn create_portfolio(&self, name: Option<&str>) -> Result<Portfolio> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_PORTFOLIO_NAME)
            .to_string();

        match &self.owner_policy {
            OwnerPolicy::Placeholder(owner) => self.insert_portfolio(name, Some(owner.clone())).await,
            OwnerPolicy::Omit => self.insert_portfolio(name, None).await,
            OwnerPolicy::PlaceholderWithFallback(owner) => {
                match self.insert_portfolio(name.clone(), Some(owner.clone())).await {
                    Err(PortfolioError::Store(message)) => {
                        tracing::warn!(
                            "Portfolio insert with placeholder owner rejected ({}), retrying without user_id",
                            message
                        );
                        self.insert_portfolio(name, None).await
                    }
                    other => other,
                }
            }
        }
    }

    async fn insert_portfolio(&self, name: String, user_id: Option<String>) -> Result<Portfolio> {
        let portfolio = self.store.insert_portfolio(&NewPortfolio { name, user_id }).await?;
        tracing::info!(id = %portfolio.id, name = %portfolio.name, "portfolio created");
        Ok(portfolio)
    }

    pub async fn list_holdings(&self, portfolio_id: &str) -> Result<Vec<Holding>> {
        self.store.list_holdings(portfolio_id).await
    }

    pub async fn add_holding(&self, portfolio_id: &str, request: HoldingRequest) -> Result<Holding> {
        let record = request.normalize()?;
        let holding = self.store.insert_holding(portfolio_id, &record).await?;
        tracing::info!(portfolio_id, symbol = %holding.symbol, "holding added");
        Ok(holding)
    }

    pub async fn update_holding(&self, holding_id: &str, request: HoldingRequest) -> Result<Holding> {
        let record = request.normalize()?;
        self.store.update_holding(holding_id, &record).await
    }

    /// Delete a holding. Unknown ids yield an empty list.
    pub async fn delete_holding(&self, holding_id: &str) -> Result<Vec<Holding>> {
        let removed = self.store.delete_holding(holding_id).await?;
        tracing::info!(holding_id, removed = removed.len(), "holding deleted");
        Ok(removed)
    }

    pub async fn valuation(&self, portfolio_id: &str) -> Result<PortfolioValuation> {
        let holdings = self.store.list_holdings(portfolio_id).await?;
        PortfolioValuation::from_holdings(portfolio_id, &holdings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::model::{AssetType, HoldingRecord, PriceUpdate};
    use crate::store::MemoryStore;

    fn request(body: serde_json::Value) -> HoldingRequest {
        serde_json::from_value(body).unwrap()
    }

    /// Store whose schema has no `user_id` column
    #[derive(Default)]
    struct NoOwnerColumnStore {
        inner: MemoryStore,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl PortfolioStore for NoOwnerColumnStore {
        async fn list_portfolios(&self) -> Result<Vec<Portfolio>> {
            self.inner.list_portfolios().await
        }

        async fn insert_portfolio(&self, portfolio: &NewPortfolio) -> Result<Portfolio> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if portfolio.user_id.is_some() {
                return Err(PortfolioError::Store(
                    "Could not find the 'user_id' column of 'portfolios' in the schema cache".into(),
                ));
            }
            self.inner.insert_portfolio(portfolio).await
        }

        async fn list_holdings(&self, portfolio_id: &str) -> Result<Vec<Holding>> {
            self.inner.list_holdings(portfolio_id).await
        }

        async fn insert_holding(&self, portfolio_id: &str, holding: &HoldingRecord) -> Result<Holding> {
            self.inner.insert_holding(portfolio_id, holding).await
        }

        async fn update_holding(&self, holding_id: &str, holding: &HoldingRecord) -> Result<Holding> {
            self.inner.update_holding(holding_id, holding).await
        }

        async fn delete_holding(&self, holding_id: &str) -> Result<Vec<Holding>> {
            self.inner.delete_holding(holding_id).await
        }

        async fn record_price(&self, holding_id: &str, update: &PriceUpdate) -> Result<()> {
            self.inner.record_price(holding_id, update).await
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "NoOwnerColumn"
        }
    }

    #[tokio::test]
    async fn test_fallback_creates_without_owner() {
        let store = Arc::new(NoOwnerColumnStore::default());
        let service = PortfolioService::new(store.clone(), OwnerPolicy::default());

        let portfolio = service.create_portfolio(None).await.unwrap();

        assert_eq!(portfolio.name, DEFAULT_PORTFOLIO_NAME);
        assert_eq!(portfolio.user_id, None);
        assert_eq!(store.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_strict_placeholder_fails() {
        let store = Arc::new(NoOwnerColumnStore::default());
        let service = PortfolioService::new(store.clone(), OwnerPolicy::Placeholder(PLACEHOLDER_OWNER_ID.into()));

        let err = service.create_portfolio(Some("Retirement")).await.unwrap_err();

        assert!(matches!(err, PortfolioError::Store(_)));
        assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
        assert!(service.list_portfolios().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_placeholder_owner_is_recorded() {
        let service = PortfolioService::new(Arc::new(MemoryStore::new()), OwnerPolicy::default());

        let portfolio = service.create_portfolio(Some("  Retirement ")).await.unwrap();

        assert_eq!(portfolio.name, "Retirement");
        assert_eq!(portfolio.user_id.as_deref(), Some(PLACEHOLDER_OWNER_ID));
        assert_eq!(service.list_portfolios().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_omit_sends_no_owner() {
        let service = PortfolioService::new(Arc::new(MemoryStore::new()), OwnerPolicy::Omit);
        let portfolio = service.create_portfolio(Some("Trading")).await.unwrap();
        assert_eq!(portfolio.user_id, None);
    }

    #[test]
    fn test_owner_policy_from_mode() {
        assert_eq!(OwnerPolicy::from_mode("omit", None).unwrap(), OwnerPolicy::Omit);
        assert_eq!(
            OwnerPolicy::from_mode("Placeholder", Some("u-1".into())).unwrap(),
            OwnerPolicy::Placeholder("u-1".into())
        );
        assert_eq!(OwnerPolicy::from_mode("fallback", Some(String::new())).unwrap(), OwnerPolicy::default());
        assert!(matches!(OwnerPolicy::from_mode("sometimes", None), Err(PortfolioError::Config(_))));
    }

    #[tokio::test]
    async fn test_holding_lifecycle() {
        let service = PortfolioService::new(Arc::new(MemoryStore::new()), OwnerPolicy::Omit);

        let added = service
            .add_holding(
                "p1",
                request(serde_json::json!({
                    "symbol": "aapl", "quantity": 10, "average_price": 150, "asset_type": "stock"
                })),
            )
            .await
            .unwrap();
        assert_eq!(added.symbol, "AAPL");
        assert_eq!(added.asset_type, Some(AssetType::Stock));

        let id = added.id.to_string();
        let updated = service
            .update_holding(
                &id,
                request(serde_json::json!({
                    "symbol": "aapl", "quantity": 12, "average_price": 148, "notes": "added on dip"
                })),
            )
            .await
            .unwrap();
        assert_eq!(updated.quantity, dec!(12));
        assert_eq!(updated.notes.as_deref(), Some("added on dip"));

        let valuation = service.valuation("p1").await.unwrap();
        assert_eq!(valuation.total_cost, dec!(1776));

        let removed = service.delete_holding(&id).await.unwrap();
        assert_eq!(removed.len(), 1);
        assert!(service.list_holdings("p1").await.unwrap().is_empty());
        assert!(service.delete_holding(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_holding_is_not_found() {
        let service = PortfolioService::new(Arc::new(MemoryStore::new()), OwnerPolicy::Omit);
        let err = service
            .update_holding(
                "missing",
                request(serde_json::json!({"symbol": "AAPL", "quantity": 1, "average_price": 1})),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PortfolioError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_holding_never_reaches_store() {
        let store = Arc::new(MemoryStore::new());
        let service = PortfolioService::new(store.clone(), OwnerPolicy::Omit);

        let err = service
            .add_holding(
                "p1",
                request(serde_json::json!({"symbol": "  ", "quantity": 1, "average_price": 1})),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PortfolioError::Validation(_)));
        assert!(store.list_holdings("p1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_valuation_rejects_oversized_rows() {
        let store = Arc::new(MemoryStore::new());
        let mut row: Holding = serde_json::from_value(serde_json::json!({
            "id": 7, "portfolio_id": "p1", "symbol": "AAPL", "quantity": 1, "average_price": 2
        }))
        .unwrap();
        row.quantity = rust_decimal::Decimal::MAX;
        store.seed_row(row).await;
        let service = PortfolioService::new(store, OwnerPolicy::Omit);

        let err = service.valuation("p1").await.unwrap_err();

        assert!(matches!(err, PortfolioError::Validation(_)));
    }
}
