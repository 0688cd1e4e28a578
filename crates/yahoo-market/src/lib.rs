//! Yahoo Finance market data client.
//!
//! Two endpoints: the v8 chart API for daily history and the v10
//! quoteSummary API for company metadata. Both are parsed from raw
//! JSON; optional fields degrade to `None` rather than failing the
//! symbol.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashboard_core::{Bar, CompanyProfile, DashboardError, MarketData};
use serde_json::Value;
use std::time::Duration;

const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

const PROFILE_MODULES: &str = "assetProfile,summaryDetail,defaultKeyStatistics,price";

#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
}

impl YahooClient {
    pub fn new() -> Self {
        // Yahoo rejects the default reqwest user agent
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client }
    }

    async fn get_json(&self, url: &str) -> Result<Value, DashboardError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DashboardError::MarketData(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DashboardError::MarketData(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DashboardError::MarketData(e.to_string()))
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketData for YahooClient {
    async fn daily_bars(&self, symbol: &str) -> Result<Vec<Bar>, DashboardError> {
        let url = format!("{}/{}?range=1y&interval=1d", CHART_URL, symbol);
        tracing::debug!(symbol, "fetching daily bars");

        let json = self.get_json(&url).await?;
        parse_chart_response(&json)
    }

    async fn company_profile(&self, symbol: &str) -> Result<CompanyProfile, DashboardError> {
        let url = format!(
            "{}/{}?modules={}",
            QUOTE_SUMMARY_URL, symbol, PROFILE_MODULES
        );
        tracing::debug!(symbol, "fetching company profile");

        let json = self.get_json(&url).await?;
        parse_quote_summary(symbol, &json)
    }
}

/// Pull the daily bars out of a v8 chart payload. Rows with any null
/// OHLCV field (half-days, halts) are dropped, matching what the
/// provider itself does for adjusted data.
pub fn parse_chart_response(json: &Value) -> Result<Vec<Bar>, DashboardError> {
    let result = json
        .pointer("/chart/result/0")
        .ok_or_else(|| DashboardError::MarketData("no chart result in response".to_string()))?;

    let timestamps = match result.get("timestamp").and_then(Value::as_array) {
        Some(ts) => ts,
        // A valid but empty chart (delisted symbol) has no timestamp array
        None => return Ok(Vec::new()),
    };

    let quote = result
        .pointer("/indicators/quote/0")
        .ok_or_else(|| DashboardError::MarketData("no quote block in chart".to_string()))?;

    let field = |name: &str| -> Result<&Vec<Value>, DashboardError> {
        quote
            .get(name)
            .and_then(Value::as_array)
            .ok_or_else(|| DashboardError::MarketData(format!("chart missing {} series", name)))
    };

    let opens = field("open")?;
    let highs = field("high")?;
    let lows = field("low")?;
    let closes = field("close")?;
    let volumes = field("volume")?;

    let mut bars = Vec::with_capacity(timestamps.len());
    for i in 0..timestamps.len() {
        let row = (
            timestamps[i].as_i64(),
            opens.get(i).and_then(Value::as_f64),
            highs.get(i).and_then(Value::as_f64),
            lows.get(i).and_then(Value::as_f64),
            closes.get(i).and_then(Value::as_f64),
            volumes.get(i).and_then(Value::as_f64),
        );
        if let (Some(ts), Some(open), Some(high), Some(low), Some(close), Some(volume)) = row {
            bars.push(Bar {
                timestamp: DateTime::<Utc>::from_timestamp(ts, 0)
                    .ok_or_else(|| DashboardError::InvalidData(format!("bad timestamp {}", ts)))?,
                open,
                high,
                low,
                close,
                volume,
            });
        }
    }

    Ok(bars)
}

/// Pull the profile fields out of a v10 quoteSummary payload.
/// Numeric fields arrive as `{"raw": n, "fmt": "..."}` objects.
pub fn parse_quote_summary(symbol: &str, json: &Value) -> Result<CompanyProfile, DashboardError> {
    let result = json
        .pointer("/quoteSummary/result/0")
        .ok_or_else(|| DashboardError::MarketData("no quoteSummary result".to_string()))?;

    let raw = |path: &str| result.pointer(path).and_then(|v| v.get("raw")).and_then(Value::as_f64);

    Ok(CompanyProfile {
        symbol: symbol.to_string(),
        short_name: result
            .pointer("/price/shortName")
            .and_then(Value::as_str)
            .map(str::to_string),
        industry: result
            .pointer("/assetProfile/industry")
            .and_then(Value::as_str)
            .map(str::to_string),
        trailing_eps: raw("/defaultKeyStatistics/trailingEps"),
        trailing_pe: raw("/summaryDetail/trailingPE"),
        book_value: raw("/defaultKeyStatistics/bookValue"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chart_payload() -> Value {
        json!({
            "chart": {
                "result": [{
                    "timestamp": [1700000000, 1700086400, 1700172800],
                    "indicators": {
                        "quote": [{
                            "open":   [100.0, 101.0, null],
                            "high":   [102.0, 103.0, 104.0],
                            "low":    [99.0, 100.0, 101.0],
                            "close":  [101.0, 102.0, 103.0],
                            "volume": [10000.0, 12000.0, 9000.0]
                        }]
                    }
                }],
                "error": null
            }
        })
    }

    #[test]
    fn chart_rows_map_to_bars() {
        let bars = parse_chart_response(&chart_payload()).unwrap();

        // Third row has a null open and is dropped
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 101.0);
        assert_eq!(bars[1].volume, 12000.0);
        assert!(bars[0].timestamp < bars[1].timestamp);
    }

    #[test]
    fn chart_without_timestamps_is_empty_not_an_error() {
        let payload = json!({"chart": {"result": [{"meta": {}}], "error": null}});

        assert!(parse_chart_response(&payload).unwrap().is_empty());
    }

    #[test]
    fn chart_without_result_is_an_error() {
        let payload = json!({"chart": {"result": null, "error": {"code": "Not Found"}}});

        assert!(parse_chart_response(&payload).is_err());
    }

    #[test]
    fn quote_summary_maps_profile_fields() {
        let payload = json!({
            "quoteSummary": {
                "result": [{
                    "assetProfile": {"industry": "Semiconductors"},
                    "summaryDetail": {"trailingPE": {"raw": 18.5, "fmt": "18.50"}},
                    "defaultKeyStatistics": {
                        "trailingEps": {"raw": 32.0, "fmt": "32.00"},
                        "bookValue": {"raw": 120.0, "fmt": "120.00"}
                    },
                    "price": {"shortName": "TSMC"}
                }],
                "error": null
            }
        });

        let profile = parse_quote_summary("2330.TW", &payload).unwrap();
        assert_eq!(profile.symbol, "2330.TW");
        assert_eq!(profile.short_name.as_deref(), Some("TSMC"));
        assert_eq!(profile.industry.as_deref(), Some("Semiconductors"));
        assert_eq!(profile.trailing_eps, Some(32.0));
        assert_eq!(profile.trailing_pe, Some(18.5));
        assert_eq!(profile.book_value, Some(120.0));
    }

    #[test]
    fn quote_summary_missing_fields_degrade_to_none() {
        let payload = json!({
            "quoteSummary": {"result": [{"price": {"shortName": "Mystery Co"}}], "error": null}
        });

        let profile = parse_quote_summary("XYZ", &payload).unwrap();
        assert!(profile.industry.is_none());
        assert!(profile.trailing_eps.is_none());
        assert!(profile.trailing_pe.is_none());
        assert!(profile.book_value.is_none());
    }
}
