//! HTTP Handlers

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use portfolio_tracker::model::{Holding, HoldingRequest, Portfolio, PortfolioValuation, RefreshResult};
use portfolio_tracker::svckit::{MarketAnalysis, PortfolioItem, PortfolioSummary};
use portfolio_tracker::PortfolioError;

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    pub llm_connected: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePortfolioQuery {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TickerRequest {
    pub ticker: String,
}

#[derive(Debug, Deserialize)]
pub struct PortfolioRequest {
    #[serde(default)]
    pub portfolio: Vec<PortfolioItem>,
}

/// `PortfolioError` rendered as `{error, code}`
pub struct ApiError(PortfolioError);

impl From<PortfolioError> for ApiError {
    fn from(err: PortfolioError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(PortfolioError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PortfolioError::Validation(_) => StatusCode::BAD_REQUEST,
            PortfolioError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }

        let body = ErrorResponse {
            error: self.0.message(),
            code: self.0.code().into(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ============================================================================
// Service
// ============================================================================

pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "Agent Service Running",
    })
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = state.store.health_check().await;
    let llm_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: if database { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        database: if database { "connected" } else { "disconnected" },
        llm_connected,
    })
}

// ============================================================================
// Portfolios & Holdings
// ============================================================================

pub async fn list_portfolios(State(state): State<AppState>) -> ApiResult<Vec<Portfolio>> {
    Ok(Json(state.portfolios.list_portfolios().await?))
}

pub async fn create_portfolio(
    State(state): State<AppState>,
    Query(query): Query<CreatePortfolioQuery>,
) -> ApiResult<Portfolio> {
    Ok(Json(state.portfolios.create_portfolio(query.name.as_deref()).await?))
}

pub async fn list_holdings(
    State(state): State<AppState>,
    Path(portfolio_id): Path<String>,
) -> ApiResult<Vec<Holding>> {
    Ok(Json(state.portfolios.list_holdings(&portfolio_id).await?))
}

pub async fn add_holding(
    State(state): State<AppState>,
    Path(portfolio_id): Path<String>,
    payload: Result<Json<HoldingRequest>, JsonRejection>,
) -> ApiResult<Holding> {
    let Json(request) = payload?;
    Ok(Json(state.portfolios.add_holding(&portfolio_id, request).await?))
}

pub async fn update_holding(
    State(state): State<AppState>,
    Path(holding_id): Path<String>,
    payload: Result<Json<HoldingRequest>, JsonRejection>,
) -> ApiResult<Holding> {
    let Json(request) = payload?;
    Ok(Json(state.portfolios.update_holding(&holding_id, request).await?))
}

pub async fn delete_holding(
    State(state): State<AppState>,
    Path(holding_id): Path<String>,
) -> ApiResult<Vec<Holding>> {
    Ok(Json(state.portfolios.delete_holding(&holding_id).await?))
}

pub async fn refresh_prices(
    State(state): State<AppState>,
    Path(portfolio_id): Path<String>,
) -> ApiResult<RefreshResult> {
    Ok(Json(state.refresher.refresh(&portfolio_id).await?))
}

pub async fn valuation(
    State(state): State<AppState>,
    Path(portfolio_id): Path<String>,
) -> ApiResult<PortfolioValuation> {
    Ok(Json(state.portfolios.valuation(&portfolio_id).await?))
}

// ============================================================================
// Agents
// ============================================================================

/// Agent endpoints always answer 200; bad bodies come back as `{error}`
#[derive(Debug, Serialize)]
pub struct AgentErrorResponse {
    pub error: String,
}

impl From<JsonRejection> for AgentErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Agent request rejected: {}", rejection.body_text());
        Self {
            error: rejection.body_text(),
        }
    }
}

pub async fn market_analyst(
    State(state): State<AppState>,
    payload: Result<Json<TickerRequest>, JsonRejection>,
) -> Result<Json<MarketAnalysis>, Json<AgentErrorResponse>> {
    let Json(request) = payload.map_err(|rejection| Json(AgentErrorResponse::from(rejection)))?;
    Ok(Json(state.analyst.analyze_market_trend(request.ticker.trim()).await))
}

pub async fn portfolio_manager(
    State(state): State<AppState>,
    payload: Result<Json<PortfolioRequest>, JsonRejection>,
) -> Result<Json<PortfolioSummary>, Json<AgentErrorResponse>> {
    let Json(request) = payload.map_err(|rejection| Json(AgentErrorResponse::from(rejection)))?;
    Ok(Json(state.manager.suggest_rebalancing(&request.portfolio).await))
}
