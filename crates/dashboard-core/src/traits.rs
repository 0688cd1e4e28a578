use crate::{Bar, CompanyProfile, DashboardError, WatchlistRow};
use async_trait::async_trait;

/// Market data provider: daily history plus company metadata
#[async_trait]
pub trait MarketData: Send + Sync {
    /// One year of daily OHLCV bars, oldest first
    async fn daily_bars(&self, symbol: &str) -> Result<Vec<Bar>, DashboardError>;

    async fn company_profile(&self, symbol: &str) -> Result<CompanyProfile, DashboardError>;
}

/// Source of the raw watchlist table
#[async_trait]
pub trait WatchlistSource: Send + Sync {
    async fn fetch_rows(&self) -> Result<Vec<WatchlistRow>, DashboardError>;
}
