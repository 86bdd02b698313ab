//! Router

use anyhow::Context;
use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{
    add_holding, create_portfolio, delete_holding, health_check, list_holdings, list_portfolios,
    market_analyst, portfolio_manager, refresh_prices, root, update_holding, valuation,
};
use crate::state::AppState;

pub fn router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let origin: HeaderValue = cors_origin
        .parse()
        .with_context(|| format!("invalid CORS origin '{cors_origin}'"))?;

    // Credentials rule out wildcards, so methods and headers mirror the request
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    let app = Router::new()
        // Health & info
        .route("/", get(root))
        .route("/health", get(health_check))

        // Portfolios
        .route("/portfolio", get(list_portfolios))
        .route("/portfolio/", get(list_portfolios))
        .route("/portfolio/create", post(create_portfolio))
        .route("/portfolio/{id}/holdings", get(list_holdings).post(add_holding))
        .route("/portfolio/{id}/refresh-prices", post(refresh_prices))
        .route("/portfolio/{id}/valuation", get(valuation))
        .route("/portfolio/holdings/{id}", put(update_holding).delete(delete_holding))

        // Agents
        .route("/agent/market-analyst", post(market_analyst))
        .route("/agent/portfolio-manager", post(portfolio_manager))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}
