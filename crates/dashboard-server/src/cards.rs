//! Card projection: `SymbolReport` in, render instructions out.
//!
//! Rendering is a pure function of the reports. Cards come out in
//! input order and unavailable symbols simply produce no card.

use dashboard_core::{SymbolOutcome, SymbolReport, TrendLabel};
use indicators::sma;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagColor {
    Green,
    Orange,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusTag {
    pub label: String,
    pub color: TagColor,
}

/// One headline metric tile. `delta` drives the up/down accent the
/// frontend puts beside the value.
#[derive(Debug, Clone, Serialize)]
pub struct MetricTile {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandlePoint {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverlayPoint {
    pub date: String,
    pub value: f64,
}

/// Candlestick series plus the 20-day moving-average overlay
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub candles: Vec<CandlePoint>,
    pub overlay_label: String,
    pub overlay: Vec<OverlayPoint>,
}

/// The expandable lower half of a card
#[derive(Debug, Clone, Serialize)]
pub struct CardDetail {
    pub chart: ChartSpec,
    pub narrative: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockCard {
    pub symbol: String,
    pub display_name: String,
    pub status: StatusTag,
    pub metrics: Vec<MetricTile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub detail: CardDetail,
}

/// Project outcomes to cards, preserving input order and dropping
/// unavailable symbols.
pub fn project_cards(outcomes: &[SymbolOutcome]) -> Vec<StockCard> {
    outcomes
        .iter()
        .filter_map(SymbolOutcome::as_report)
        .map(build_card)
        .collect()
}

pub fn build_card(report: &SymbolReport) -> StockCard {
    StockCard {
        symbol: report.symbol.clone(),
        display_name: report.display_name.clone(),
        status: status_tag(report.trend),
        metrics: headline_metrics(report),
        warning: stop_warning(report),
        detail: CardDetail {
            chart: chart_spec(report),
            narrative: narrative(report),
        },
    }
}

fn status_tag(trend: TrendLabel) -> StatusTag {
    StatusTag {
        label: trend.label().to_string(),
        color: match trend {
            TrendLabel::Strong => TagColor::Green,
            TrendLabel::Weakening => TagColor::Orange,
        },
    }
}

/// Four tiles: price and intrinsic value always; then either the
/// position view (return on cost, stop-loss) or the momentum view
/// (stochastic %K, RSI) depending on whether a cost basis exists.
/// A presentation branch only; the report is the same either way.
fn headline_metrics(report: &SymbolReport) -> Vec<MetricTile> {
    let tile = |label: &str, value: String| MetricTile {
        label: label.to_string(),
        value,
        delta: None,
    };

    let intrinsic = match report.intrinsic_value {
        Some(value) => format!("{:.2}", value),
        None => "—".to_string(),
    };

    let mut metrics = vec![
        tile("Price", format!("{:.2}", report.latest_close)),
        tile(
            &format!("Intrinsic value ({})", report.valuation_model.label()),
            intrinsic,
        ),
    ];

    match report.return_on_cost {
        Some(roc) => {
            metrics.push(MetricTile {
                label: "Return on cost".to_string(),
                value: format!("{:.2}%", roc),
                delta: Some(format!("{:.2}%", roc)),
            });
            metrics.push(tile("Stop-loss", format!("{:.2}", report.stop_loss)));
        }
        None => {
            metrics.push(tile(
                "Stochastic %K",
                format!("{:.1}", report.indicators.stochastic_k),
            ));
            metrics.push(tile("RSI (14)", format!("{:.1}", report.indicators.rsi14)));
        }
    }

    metrics
}

/// Blocking warning, shown only for a held position whose price has
/// fallen through the ATR stop
fn stop_warning(report: &SymbolReport) -> Option<String> {
    if report.return_on_cost.is_some() && report.latest_close < report.stop_loss {
        Some(format!(
            "Price {:.2} is below the ATR stop at {:.2}, review the position",
            report.latest_close, report.stop_loss
        ))
    } else {
        None
    }
}

fn chart_spec(report: &SymbolReport) -> ChartSpec {
    let candles = report
        .series
        .iter()
        .map(|bar| CandlePoint {
            date: bar.timestamp.format("%Y-%m-%d").to_string(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
        })
        .collect();

    // SMA values align to the end of the series: the first overlay
    // point sits on the 20th bar
    let closes: Vec<f64> = report.series.iter().map(|b| b.close).collect();
    let ma = sma(&closes, 20);
    let offset = report.series.len() - ma.len();
    let overlay = ma
        .into_iter()
        .enumerate()
        .map(|(i, value)| OverlayPoint {
            date: report.series[offset + i]
                .timestamp
                .format("%Y-%m-%d")
                .to_string(),
            value,
        })
        .collect();

    ChartSpec {
        candles,
        overlay_label: "MA20".to_string(),
        overlay,
    }
}

/// One templated sentence: valuation verdict, momentum verdict, and a
/// bullish stance only when both agree.
fn narrative(report: &SymbolReport) -> String {
    let momentum_bullish = report.indicators.macd_histogram > 0.0;
    let momentum = if momentum_bullish {
        "momentum is strengthening"
    } else {
        "momentum is weakening"
    };

    match report.intrinsic_value {
        Some(intrinsic) => {
            let value_bullish = report.latest_close < intrinsic;
            let valuation = if value_bullish {
                "Price sits below estimated value with a margin of safety"
            } else {
                "Price sits above estimated value and looks stretched"
            };
            let stance = if value_bullish && momentum_bullish {
                "lean long"
            } else {
                "hold off for now"
            };
            format!("{}, and {}. Suggested stance: {}.", valuation, momentum, stance)
        }
        None => format!(
            "No valuation estimate is available, and {}. Suggested stance: hold off for now.",
            momentum
        ),
    }
}
