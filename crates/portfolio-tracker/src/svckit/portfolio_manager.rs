//! Portfolio Manager Agent
//!
//! Runs the market analyst over every holding of a client-supplied portfolio.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::market_analyst::{MarketAnalysis, MarketAnalyst};
use crate::quote::MarketSnapshot;

/// One portfolio line as posted by the client. Only `symbol` is read.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PortfolioItem {
    #[serde(default)]
    pub symbol: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-symbol manager output
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Recommendation {
    Error {
        symbol: String,
        action: String,
        reason: String,
    },
    Analysis {
        symbol: String,
        current_analysis: String,
        market_data: MarketSnapshot,
    },
}

impl Recommendation {
    pub fn symbol(&self) -> &str {
        match self {
            Self::Error { symbol, .. } | Self::Analysis { symbol, .. } => symbol,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub portfolio_summary: Vec<Recommendation>,
}

pub struct PortfolioManager {
    analyst: Arc<MarketAnalyst>,
}

impl PortfolioManager {
    pub const fn new(analyst: Arc<MarketAnalyst>) -> Self {
        Self { analyst }
    }

    /// Analyze each item with a non-empty symbol, in order.
    pub async fn suggest_rebalancing(&self, items: &[PortfolioItem]) -> PortfolioSummary {
        let mut summary = PortfolioSummary::default();

        for symbol in items
            .iter()
            .filter_map(|item| item.symbol.as_deref())
            .filter(|s| !s.trim().is_empty())
        {
            let recommendation = match self.analyst.analyze_market_trend(symbol).await {
                MarketAnalysis::Success { data, analysis, .. } => Recommendation::Analysis {
                    symbol: symbol.to_string(),
                    current_analysis: analysis,
                    market_data: data,
                },
                MarketAnalysis::Failure { error } => Recommendation::Error {
                    symbol: symbol.to_string(),
                    action: "ERROR".into(),
                    reason: error,
                },
            };
            summary.portfolio_summary.push(recommendation);
        }

        tracing::info!(analyzed = summary.portfolio_summary.len(), "portfolio review complete");
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::GenerationOptions;

    use crate::quote::MockQuoteClient;
    use crate::svckit::market_analyst::tests::ScriptedProvider;

    fn items(body: serde_json::Value) -> Vec<PortfolioItem> {
        serde_json::from_value(body).unwrap()
    }

    fn manager(quotes: MockQuoteClient, provider: Arc<ScriptedProvider>) -> PortfolioManager {
        let analyst = MarketAnalyst::new(Arc::new(quotes), provider, GenerationOptions::default());
        PortfolioManager::new(Arc::new(analyst))
    }

    #[tokio::test]
    async fn test_items_without_symbol_are_skipped() {
        let provider = Arc::new(ScriptedProvider::replying("Neutral"));
        let manager = manager(MockQuoteClient::new(), provider.clone());

        let summary = manager
            .suggest_rebalancing(&items(serde_json::json!([
                {"symbol": "AAPL", "quantity": 10},
                {"symbol": null},
                {"quantity": 3},
                {"symbol": ""}
            ])))
            .await;

        assert_eq!(summary.portfolio_summary.len(), 1);
        assert_eq!(summary.portfolio_summary[0].symbol(), "AAPL");
        assert_eq!(provider.calls(), 1);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["portfolio_summary"][0]["current_analysis"], "Neutral");
        assert_eq!(json["portfolio_summary"][0]["market_data"]["symbol"], "AAPL");
    }

    #[tokio::test]
    async fn test_failures_become_error_entries() {
        let provider = Arc::new(ScriptedProvider::replying("Bearish"));
        let manager = manager(MockQuoteClient::new().with_failure("NVDA", "rate limited"), provider);

        let summary = manager
            .suggest_rebalancing(&items(serde_json::json!([{"symbol": "NVDA"}, {"symbol": "MSFT"}])))
            .await;

        assert_eq!(
            summary.portfolio_summary[0],
            Recommendation::Error {
                symbol: "NVDA".into(),
                action: "ERROR".into(),
                reason: "Failed to fetch data: rate limited".into(),
            }
        );
        assert!(matches!(summary.portfolio_summary[1], Recommendation::Analysis { .. }));
    }

    #[tokio::test]
    async fn test_empty_portfolio() {
        let manager = manager(MockQuoteClient::new(), Arc::new(ScriptedProvider::replying("x")));
        let summary = manager.suggest_rebalancing(&[]).await;
        assert_eq!(
            serde_json::to_value(summary).unwrap(),
            serde_json::json!({"portfolio_summary": []})
        );
    }
}
