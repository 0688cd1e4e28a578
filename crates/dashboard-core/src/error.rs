use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Watchlist source error: {0}")]
    SourceUnavailable(String),

    #[error("Market data error: {0}")]
    MarketData(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}
