//! Watchboard HTTP server: one dashboard route that loads the
//! memoized watchlist, analyzes each row in sheet order, and returns
//! the projected cards.

pub mod cards;
pub mod dashboard_routes;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use sheet_watchlist::{CachedWatchlist, SheetCsvSource};
use std::sync::Arc;
use std::time::Duration;
use symbol_analyzer::SymbolAnalyzer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use yahoo_market::YahooClient;

#[derive(Clone)]
pub struct AppState {
    pub watchlist: Arc<CachedWatchlist<SheetCsvSource>>,
    pub analyzer: Arc<SymbolAnalyzer<YahooClient>>,
}

/// Standard response envelope
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Route-level error: anything that escapes a handler becomes a JSON
/// 500. Per-symbol and watchlist failures are absorbed well before
/// this point, so these are genuine server faults.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error(self.0.to_string())),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

pub struct Config {
    pub sheet_url: String,
    pub bind: String,
    pub watchlist_ttl: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let sheet_url = std::env::var("WATCHBOARD_SHEET_URL")
            .map_err(|_| anyhow::anyhow!("WATCHBOARD_SHEET_URL is not set"))?;

        let bind =
            std::env::var("WATCHBOARD_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let ttl_secs = std::env::var("WATCHBOARD_WATCHLIST_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(600);

        Ok(Self {
            sheet_url,
            bind,
            watchlist_ttl: Duration::from_secs(ttl_secs),
        })
    }
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            watchlist: Arc::new(CachedWatchlist::new(
                SheetCsvSource::new(config.sheet_url.clone()),
                config.watchlist_ttl,
            )),
            analyzer: Arc::new(SymbolAnalyzer::new(YahooClient::new())),
        }
    }
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let state = AppState::new(&config);

    let app = Router::new()
        .merge(dashboard_routes::dashboard_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!(addr = %config.bind, "watchboard listening");
    axum::serve(listener, app).await?;

    Ok(())
}
