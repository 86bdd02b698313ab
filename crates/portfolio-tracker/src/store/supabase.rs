//! Supabase Store
//!
//! Talks to the Supabase REST interface (PostgREST) over the `portfolios`
//! and `holdings` tables.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::PortfolioStore;
use crate::error::{PortfolioError, Result};
use crate::model::{Holding, HoldingRecord, NewPortfolio, Portfolio, PriceUpdate};

const PORTFOLIOS: &str = "portfolios";
const HOLDINGS: &str = "holdings";

/// Supabase connection settings
#[derive(Clone, Debug)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`
    pub url: String,

    /// anon or service-role key
    pub api_key: String,

    pub timeout_secs: u64,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            timeout_secs: 30,
        }
    }

    pub fn from_env() -> Result<Self> {
        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| PortfolioError::Config("SUPABASE_URL not set".into()))?;
        let api_key = std::env::var("SUPABASE_KEY")
            .map_err(|_| PortfolioError::Config("SUPABASE_KEY not set".into()))?;
        let timeout_secs = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            url,
            api_key,
            timeout_secs,
        })
    }
}

/// Error body returned by PostgREST
#[derive(Deserialize)]
struct PostgrestError {
    message: String,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Serialize)]
struct NewHolding<'a> {
    portfolio_id: &'a str,
    #[serde(flatten)]
    record: &'a HoldingRecord,
}

pub struct SupabaseStore {
    http: reqwest::Client,
    config: SupabaseConfig,
}

impl SupabaseStore {
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PortfolioError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(SupabaseConfig::from_env()?)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, self.table_url(table))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    /// `Prefer: return=representation` makes writes echo the affected rows
    fn returning(builder: RequestBuilder) -> RequestBuilder {
        builder.header("Prefer", "return=representation")
    }

    async fn send(builder: RequestBuilder) -> Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| PortfolioError::Store(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(PortfolioError::Store(Self::error_message(status, &body)))
    }

    fn error_message(status: reqwest::StatusCode, body: &str) -> String {
        match serde_json::from_str::<PostgrestError>(body) {
            Ok(PostgrestError {
                message,
                details: Some(details),
            }) if !details.is_empty() => format!("{message} ({details})"),
            Ok(err) => err.message,
            Err(_) if body.is_empty() => format!("HTTP {status}"),
            Err(_) => format!("HTTP {status}: {body}"),
        }
    }

    async fn rows<T: DeserializeOwned>(builder: RequestBuilder) -> Result<Vec<T>> {
        Self::send(builder)
            .await?
            .json()
            .await
            .map_err(|e| PortfolioError::Store(format!("Malformed store response: {e}")))
    }

    async fn first_row<T: DeserializeOwned>(builder: RequestBuilder, what: &str) -> Result<T> {
        Self::rows(builder)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PortfolioError::Store(format!("{what} returned no rows")))
    }

    fn eq(value: &str) -> String {
        format!("eq.{value}")
    }
}

#[async_trait]
impl PortfolioStore for SupabaseStore {
    async fn list_portfolios(&self) -> Result<Vec<Portfolio>> {
        Self::rows(self.request(Method::GET, PORTFOLIOS).query(&[("select", "*")])).await
    }

    async fn insert_portfolio(&self, portfolio: &NewPortfolio) -> Result<Portfolio> {
        let builder = Self::returning(self.request(Method::POST, PORTFOLIOS)).json(portfolio);
        Self::first_row(builder, "portfolio insert").await
    }

    async fn list_holdings(&self, portfolio_id: &str) -> Result<Vec<Holding>> {
        let builder = self
            .request(Method::GET, HOLDINGS)
            .query(&[("select", "*".to_string()), ("portfolio_id", Self::eq(portfolio_id))]);
        Self::rows(builder).await
    }

    async fn insert_holding(&self, portfolio_id: &str, holding: &HoldingRecord) -> Result<Holding> {
        let body = NewHolding {
            portfolio_id,
            record: holding,
        };
        let builder = Self::returning(self.request(Method::POST, HOLDINGS)).json(&body);
        Self::first_row(builder, "holding insert").await
    }

    async fn update_holding(&self, holding_id: &str, holding: &HoldingRecord) -> Result<Holding> {
        let builder = Self::returning(self.request(Method::PATCH, HOLDINGS))
            .query(&[("id", Self::eq(holding_id))])
            .json(holding);

        Self::rows(builder)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PortfolioError::NotFound(format!("holding {holding_id}")))
    }

    async fn delete_holding(&self, holding_id: &str) -> Result<Vec<Holding>> {
        let builder = Self::returning(self.request(Method::DELETE, HOLDINGS))
            .query(&[("id", Self::eq(holding_id))]);
        Self::rows(builder).await
    }

    async fn record_price(&self, holding_id: &str, update: &PriceUpdate) -> Result<()> {
        let builder = self
            .request(Method::PATCH, HOLDINGS)
            .header("Prefer", "return=minimal")
            .query(&[("id", Self::eq(holding_id))])
            .json(update);

        Self::send(builder).await.map(|_| ())
    }

    async fn health_check(&self) -> bool {
        let builder = self
            .request(Method::GET, PORTFOLIOS)
            .query(&[("select", "id"), ("limit", "1")]);

        match Self::send(builder).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Supabase health check failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &str {
        "Supabase"
    }
}
