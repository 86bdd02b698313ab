//! Server Configuration
//!
//! Read once at start-up from the environment (after `.env` is loaded).

use anyhow::{bail, Context};
use agent_core::provider::DEFAULT_MODEL;
use portfolio_tracker::OwnerPolicy;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Supabase,
    Memory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuoteProvider {
    Yahoo,
    Mock,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub cors_origin: String,
    pub store_backend: StoreBackend,
    pub quote_provider: QuoteProvider,
    pub model: String,
    pub owner_policy: OwnerPolicy,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let var = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.into());

        let store_backend = match var("STORE_BACKEND", "supabase").to_lowercase().as_str() {
            "supabase" => StoreBackend::Supabase,
            "memory" => StoreBackend::Memory,
            other => bail!("unknown STORE_BACKEND '{other}' (expected supabase or memory)"),
        };

        let quote_provider = match var("QUOTE_PROVIDER", "yahoo").to_lowercase().as_str() {
            "yahoo" => QuoteProvider::Yahoo,
            "mock" => QuoteProvider::Mock,
            other => bail!("unknown QUOTE_PROVIDER '{other}' (expected yahoo or mock)"),
        };

        let owner_policy = OwnerPolicy::from_env().context("invalid portfolio owner settings")?;

        Ok(Self {
            bind_addr: var("BIND_ADDR", "0.0.0.0:8000"),
            cors_origin: var("CORS_ORIGIN", "http://localhost:3000"),
            store_backend,
            quote_provider,
            model: var("OPENAI_MODEL", DEFAULT_MODEL),
            owner_policy,
        })
    }
}
