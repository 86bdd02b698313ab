//! Market Analyst Agent
//!
//! Fetches a quote for one ticker and asks the language model for a short
//! trend summary. Failures are reported in the result, never raised.

use std::sync::Arc;

use agent_core::{GenerationOptions, LlmProvider, Message};
use serde::{Deserialize, Serialize};

use crate::quote::{MarketSnapshot, QuoteClient};
use crate::MARKET_ANALYST_PROMPT;

/// Analyst output: either the commentary or an error message
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarketAnalysis {
    Success {
        symbol: String,
        data: MarketSnapshot,
        analysis: String,
    },
    Failure {
        error: String,
    },
}

impl MarketAnalysis {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure { error: error.into() }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }
}

pub struct MarketAnalyst {
    quotes: Arc<dyn QuoteClient>,
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
}

impl MarketAnalyst {
    pub fn new(
        quotes: Arc<dyn QuoteClient>,
        provider: Arc<dyn LlmProvider>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            quotes,
            provider,
            options,
        }
    }

    /// Fixed-template description of a snapshot
    pub fn context(ticker: &str, data: &MarketSnapshot) -> String {
        format!(
            "Ticker: {}\nCurrent Price: {}\nOpen: {}\nDay High: {}\nDay Low: {}\nVolume: {}",
            ticker, data.current_price, data.open, data.day_high, data.day_low, data.volume
        )
    }

    pub async fn analyze_market_trend(&self, ticker: &str) -> MarketAnalysis {
        let quote = match self.quotes.quote(ticker).await {
            Ok(quote) => quote,
            Err(e) => {
                tracing::warn!(ticker, "market data fetch failed: {}", e);
                return MarketAnalysis::failure(format!("Failed to fetch data: {}", e.message()));
            }
        };

        let data = quote.snapshot();
        let messages = [
            Message::system(MARKET_ANALYST_PROMPT),
            Message::user(format!(
                "Analyze this stock data:\n{}",
                Self::context(ticker, &data)
            )),
        ];

        tracing::debug!(ticker, provider = self.provider.name(), model = %self.options.model, "requesting analysis");

        match self.provider.complete(&messages, &self.options).await {
            Ok(completion) => MarketAnalysis::Success {
                symbol: ticker.to_string(),
                data,
                analysis: completion.content,
            },
            Err(e) => {
                tracing::warn!(ticker, "analysis failed: {}", e);
                MarketAnalysis::failure(e.to_string())
            }
        }
    }
}
