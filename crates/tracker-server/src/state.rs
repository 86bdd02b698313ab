//! Application State

use std::sync::Arc;

use agent_core::{GenerationOptions, LlmProvider};
use portfolio_tracker::{
    MarketAnalyst, OwnerPolicy, PortfolioManager, PortfolioService, PortfolioStore, PriceRefresher,
    QuoteClient,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Hosted store (Supabase, or in-memory for development)
    pub store: Arc<dyn PortfolioStore>,

    /// LLM provider behind the agents
    pub provider: Arc<dyn LlmProvider>,

    pub portfolios: Arc<PortfolioService>,
    pub refresher: Arc<PriceRefresher>,
    pub analyst: Arc<MarketAnalyst>,
    pub manager: Arc<PortfolioManager>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn PortfolioStore>,
        quotes: Arc<dyn QuoteClient>,
        provider: Arc<dyn LlmProvider>,
        options: GenerationOptions,
        owner_policy: OwnerPolicy,
    ) -> Self {
        let analyst = Arc::new(MarketAnalyst::new(quotes.clone(), provider.clone(), options));

        Self {
            portfolios: Arc::new(PortfolioService::new(store.clone(), owner_policy)),
            refresher: Arc::new(PriceRefresher::new(store.clone(), quotes)),
            manager: Arc::new(PortfolioManager::new(analyst.clone())),
            analyst,
            store,
            provider,
        }
    }
}
