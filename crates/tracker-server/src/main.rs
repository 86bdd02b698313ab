//! portfolio-tracker HTTP Server
//!
//! Axum-based server exposing portfolio CRUD, price refresh and the
//! market analyst / portfolio manager agents.

mod config;
mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{GenerationOptions, LlmProvider};
use agent_runtime::{OpenAiConfig, OpenAiProvider};
use portfolio_tracker::{
    MemoryStore, MockQuoteClient, PortfolioStore, QuoteClient, SupabaseStore, YahooQuoteClient,
};

use crate::config::{QuoteProvider, ServerConfig, StoreBackend};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Initialize store
    let store: Arc<dyn PortfolioStore> = match config.store_backend {
        StoreBackend::Supabase => Arc::new(
            SupabaseStore::from_env().context("Supabase backend selected but not configured")?,
        ),
        StoreBackend::Memory => {
            tracing::warn!("⚠ Using in-memory store - data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    if store.health_check().await {
        tracing::info!("✓ Connected to {} store", store.name());
    } else {
        tracing::warn!("⚠ {} store not reachable - portfolio endpoints will fail", store.name());
    }

    // Initialize quote provider
    let quotes: Arc<dyn QuoteClient> = match config.quote_provider {
        QuoteProvider::Yahoo => Arc::new(YahooQuoteClient::from_env()?),
        QuoteProvider::Mock => Arc::new(MockQuoteClient::new()),
    };
    tracing::info!("✓ Quote provider: {}", quotes.name());

    // Initialize LLM provider
    let provider: Arc<dyn LlmProvider> = match OpenAiProvider::from_env() {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            tracing::warn!("⚠ {} - agent endpoints will report errors", e);
            tracing::warn!("  Set OPENAI_API_KEY in .env");
            Arc::new(OpenAiProvider::from_config(OpenAiConfig::default())?)
        }
    };

    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to {} (model {})", provider.name(), config.model),
        Ok(false) | Err(_) => tracing::warn!("⚠ {} not available - agents will fail", provider.name()),
    }

    // Build application state
    let state = AppState::new(
        store,
        quotes,
        provider,
        GenerationOptions::with_model(config.model.as_str()),
        config.owner_policy.clone(),
    );
    tracing::info!("Portfolio owner policy: {:?}", config.owner_policy);

    let app = routes::router(state, &config.cors_origin)?;

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 portfolio tracker running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health                        - Health check");
    tracing::info!("  GET    /portfolio/                    - List portfolios");
    tracing::info!("  POST   /portfolio/create              - Create portfolio");
    tracing::info!("  GET    /portfolio/{{id}}/holdings       - List holdings");
    tracing::info!("  POST   /portfolio/{{id}}/holdings       - Add holding");
    tracing::info!("  PUT    /portfolio/holdings/{{id}}       - Update holding");
    tracing::info!("  DELETE /portfolio/holdings/{{id}}       - Delete holding");
    tracing::info!("  POST   /portfolio/{{id}}/refresh-prices - Refresh prices");
    tracing::info!("  GET    /portfolio/{{id}}/valuation      - Portfolio valuation");
    tracing::info!("  POST   /agent/market-analyst          - Market analysis");
    tracing::info!("  POST   /agent/portfolio-manager       - Portfolio review");
    tracing::info!("  CORS origin: {}", config.cors_origin);
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
