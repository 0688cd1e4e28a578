use async_trait::async_trait;
use dashboard_core::{DashboardError, WatchlistRow, WatchlistSource};
use std::time::Duration;

/// Reads the watchlist from a Google Sheet published as CSV.
/// The sheet needs a `Ticker` column; `Cost` and `Note` are optional.
#[derive(Clone)]
pub struct SheetCsvSource {
    client: reqwest::Client,
    url: String,
}

impl SheetCsvSource {
    pub fn new(url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, url }
    }
}

#[async_trait]
impl WatchlistSource for SheetCsvSource {
    async fn fetch_rows(&self) -> Result<Vec<WatchlistRow>, DashboardError> {
        tracing::debug!(url = %self.url, "fetching watchlist sheet");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| DashboardError::SourceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DashboardError::SourceUnavailable(format!(
                "HTTP {} reading watchlist sheet",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DashboardError::SourceUnavailable(e.to_string()))?;

        parse_watchlist_csv(&body)
    }
}

/// Parse the sheet CSV. Columns are located by header name so extra
/// or reordered columns in the sheet don't break the read.
pub fn parse_watchlist_csv(data: &str) -> Result<Vec<WatchlistRow>, DashboardError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DashboardError::SourceUnavailable(e.to_string()))?
        .clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };

    let ticker_col = column("Ticker")
        .ok_or_else(|| DashboardError::SourceUnavailable("sheet has no Ticker column".to_string()))?;
    let cost_col = column("Cost");
    let note_col = column("Note");

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DashboardError::SourceUnavailable(e.to_string()))?;

        let ticker = record.get(ticker_col).unwrap_or("").trim().to_string();
        if ticker.is_empty() {
            continue;
        }

        // Only a positive, parseable cost counts as a cost basis
        let cost_basis = cost_col
            .and_then(|i| record.get(i))
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|c| *c > 0.0);

        let note = note_col
            .and_then(|i| record.get(i))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        rows.push(WatchlistRow {
            ticker,
            cost_basis,
            note,
        });
    }

    Ok(rows)
}
