use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar data, one per trading day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// One row of the cloud watchlist sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistRow {
    pub ticker: String,
    /// Present iff the sheet holds a positive number in the Cost column
    pub cost_basis: Option<f64>,
    pub note: Option<String>,
}

/// Company metadata from the market data provider.
/// Field availability is provider-dependent; absence is not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub symbol: String,
    pub short_name: Option<String>,
    pub industry: Option<String>,
    pub trailing_eps: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub book_value: Option<f64>,
}

/// Latest values of the indicator set computed over the full bar series
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub stochastic_k: f64,
    pub rsi14: f64,
    pub macd_histogram: f64,
    pub atr14: f64,
}

/// Which valuation heuristic priced the symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValuationModel {
    PriceToEarnings,
    PriceToBook,
}

impl ValuationModel {
    pub fn label(&self) -> &'static str {
        match self {
            ValuationModel::PriceToEarnings => "P/E",
            ValuationModel::PriceToBook => "P/B",
        }
    }
}

/// Trend diagnosis: latest close vs the 20-day moving average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendLabel {
    Strong,
    Weakening,
}

impl TrendLabel {
    pub fn label(&self) -> &'static str {
        match self {
            TrendLabel::Strong => "Trend strong",
            TrendLabel::Weakening => "Trend weakening",
        }
    }
}

/// Full analysis of one symbol for one render cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub display_name: String,
    pub series: Vec<Bar>,
    pub latest_close: f64,
    /// None when the selected model's driving field is missing upstream
    pub intrinsic_value: Option<f64>,
    pub valuation_model: ValuationModel,
    pub indicators: IndicatorSnapshot,
    pub sma20: f64,
    pub stop_loss: f64,
    pub trend: TrendLabel,
    /// Present iff a positive cost basis was supplied
    pub return_on_cost: Option<f64>,
}

/// Why a symbol produced no report this cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnavailableReason {
    /// Provider returned no bars at all
    EmptySeries,
    /// Bars returned but too few for the indicator set
    InsufficientHistory,
    /// Fetch or decode failure talking to the provider
    MarketData(String),
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnavailableReason::EmptySeries => write!(f, "empty price series"),
            UnavailableReason::InsufficientHistory => write!(f, "insufficient price history"),
            UnavailableReason::MarketData(msg) => write!(f, "market data error: {}", msg),
        }
    }
}

/// Outcome of analyzing one watchlist row. Unavailable symbols are
/// skipped by the presentation layer; they never abort the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SymbolOutcome {
    Report(Box<SymbolReport>),
    Unavailable {
        symbol: String,
        reason: UnavailableReason,
    },
}

impl SymbolOutcome {
    pub fn symbol(&self) -> &str {
        match self {
            SymbolOutcome::Report(report) => &report.symbol,
            SymbolOutcome::Unavailable { symbol, .. } => symbol,
        }
    }

    pub fn as_report(&self) -> Option<&SymbolReport> {
        match self {
            SymbolOutcome::Report(report) => Some(report.as_ref()),
            SymbolOutcome::Unavailable { .. } => None,
        }
    }
}
