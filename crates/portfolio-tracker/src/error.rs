//! Error Types for the Portfolio Tracker

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PortfolioError>;

#[derive(Error, Debug)]
pub enum PortfolioError {
    /// The persistence gateway rejected or failed a request
    #[error("Store error: {0}")]
    Store(String),

    /// The quote provider could not produce a price for a symbol
    #[error("Quote provider error for {symbol}: {message}")]
    Provider { symbol: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Language model error: {0}")]
    Llm(#[from] agent_core::AgentError),
}

impl PortfolioError {
    pub fn provider(symbol: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            symbol: symbol.into(),
            message: message.into(),
        }
    }

    /// The underlying message, without the error-kind prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Store(msg)
            | Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Config(msg) => msg.clone(),
            Self::Provider { message, .. } => message.clone(),
            Self::Llm(e) => e.to_string(),
        }
    }

    /// Stable machine-readable code for API responses
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Store(_) => "STORE_ERROR",
            Self::Provider { .. } => "PROVIDER_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "INVALID_INPUT",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Llm(_) => "LLM_ERROR",
        }
    }
}
