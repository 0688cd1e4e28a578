//! Dashboard API routes

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::cards::{project_cards, StockCard};
use crate::{ApiResponse, AppError, AppState};

#[derive(Serialize)]
pub struct DashboardResponse {
    /// Non-fatal loader notice, set when the sheet read failed and
    /// the table degraded to empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    /// Number of rows in the watchlist table this cycle
    pub watching: usize,
    pub cards: Vec<StockCard>,
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/dashboard", get(get_dashboard))
}

async fn health() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("ok"))
}

/// Build the whole page: memoized watchlist load, then one analysis
/// per row, serially and in sheet order so cards render in the order
/// the user wrote them.
async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardResponse>>, AppError> {
    let mut snapshot = state.watchlist.load().await;
    if snapshot.rows.is_empty() && snapshot.notice.is_none() {
        snapshot.notice =
            Some("Watchlist is empty, add tickers (e.g. 2330.TW) to the sheet".to_string());
    }

    let mut outcomes = Vec::with_capacity(snapshot.rows.len());
    for row in &snapshot.rows {
        outcomes.push(state.analyzer.analyze(&row.ticker, row.cost_basis).await);
    }

    let cards = project_cards(&outcomes);
    tracing::info!(
        watching = snapshot.rows.len(),
        rendered = cards.len(),
        "dashboard built"
    );

    Ok(Json(ApiResponse::success(DashboardResponse {
        notice: snapshot.notice,
        watching: snapshot.rows.len(),
        cards,
    })))
}
