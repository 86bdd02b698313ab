//! Yahoo Finance Quote Client
//!
//! Reads the public chart endpoint (`/v8/finance/chart/{symbol}`). No API key
//! is required; covers equities, ETFs, index funds, crypto pairs (`BTC-USD`)
//! and futures such as gold (`GC=F`).

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{Quote, QuoteClient};
use crate::error::{PortfolioError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) portfolio-tracker/0.1";

#[derive(Clone, Debug)]
pub struct YahooConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".into(),
            timeout_secs: 30,
        }
    }
}

impl YahooConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("YAHOO_BASE_URL").unwrap_or(defaults.base_url),
            timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }
}

#[derive(Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    regular_market_price: Option<Decimal>,
    #[serde(default)]
    regular_market_day_high: Option<Decimal>,
    #[serde(default)]
    regular_market_day_low: Option<Decimal>,
    #[serde(default)]
    regular_market_volume: Option<u64>,
}

#[derive(Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<IndicatorQuote>,
}

#[derive(Default, Deserialize)]
struct IndicatorQuote {
    #[serde(default)]
    open: Vec<Option<Decimal>>,
    #[serde(default)]
    high: Vec<Option<Decimal>>,
    #[serde(default)]
    low: Vec<Option<Decimal>>,
    #[serde(default)]
    close: Vec<Option<Decimal>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

impl ChartResult {
    fn into_quote(self, requested: &str) -> Quote {
        let series = self
            .indicators
            .and_then(|i| i.quote.into_iter().next())
            .unwrap_or_default();

        let current_price = series.close.iter().rev().find_map(|c| *c);
        let open = series.open.iter().find_map(|o| *o);
        let day_high = self
            .meta
            .regular_market_day_high
            .or_else(|| series.high.iter().flatten().max().copied());
        let day_low = self
            .meta
            .regular_market_day_low
            .or_else(|| series.low.iter().flatten().min().copied());
        let volume = self.meta.regular_market_volume.or_else(|| {
            let total: u64 = series.volume.iter().flatten().sum();
            (total > 0).then_some(total)
        });

        Quote {
            symbol: self.meta.symbol.unwrap_or_else(|| requested.to_string()),
            last_price: self.meta.regular_market_price,
            current_price,
            regular_market_price: self.meta.regular_market_price,
            open,
            day_high,
            day_low,
            volume,
        }
    }
}

/// Yahoo Finance chart API client
pub struct YahooQuoteClient {
    http: reqwest::Client,
    config: YahooConfig,
}

impl YahooQuoteClient {
    pub fn new(config: YahooConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PortfolioError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(YahooConfig::from_env())
    }

    /// Chart endpoint for `symbol`, escaped as a single path segment
    fn chart_url(&self, symbol: &str) -> Result<reqwest::Url> {
        let base = &self.config.base_url;
        let mut url = reqwest::Url::parse(base)
            .map_err(|e| PortfolioError::Config(format!("invalid YAHOO_BASE_URL '{base}': {e}")))?;
        url.path_segments_mut()
            .map_err(|()| PortfolioError::Config(format!("YAHOO_BASE_URL '{base}' cannot carry a path")))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }

    async fn chart(&self, symbol: &str) -> Result<ChartResult> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(PortfolioError::provider(symbol, "symbol must not be empty"));
        }

        let response = self
            .http
            .get(self.chart_url(symbol)?)
            .query(&[("interval", "1d"), ("range", "1d")])
            .send()
            .await
            .map_err(|e| PortfolioError::provider(symbol, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PortfolioError::provider(symbol, e.to_string()))?;

        Self::parse_chart(symbol, status, &body)
    }

    /// Yahoo reports unknown symbols as a 404 with a JSON `chart.error`
    fn parse_chart(symbol: &str, status: reqwest::StatusCode, body: &str) -> Result<ChartResult> {
        let envelope: ChartEnvelope = match serde_json::from_str(body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(PortfolioError::provider(symbol, format!("HTTP {status}")));
            }
            Err(e) => {
                return Err(PortfolioError::provider(
                    symbol,
                    format!("unexpected chart response: {e}"),
                ));
            }
        };

        if let Some(error) = envelope.chart.error {
            let message = if error.description.is_empty() {
                error.code
            } else {
                error.description
            };
            return Err(PortfolioError::provider(symbol, message));
        }

        envelope
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| PortfolioError::provider(symbol, "no chart data returned"))
    }
}

#[async_trait]
impl QuoteClient for YahooQuoteClient {
    async fn fast_price(&self, symbol: &str) -> Result<Option<Decimal>> {
        Ok(self.chart(symbol).await?.meta.regular_market_price)
    }

    async fn quote(&self, symbol: &str) -> Result<Quote> {
        Ok(self.chart(symbol).await?.into_quote(symbol))
    }

    async fn health_check(&self) -> bool {
        match self.chart("SPY").await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Yahoo Finance health check failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &str {
        "Yahoo Finance"
    }
}
