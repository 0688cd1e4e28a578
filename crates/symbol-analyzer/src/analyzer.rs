use crate::valuation::{intrinsic_value, model_for_industry};
use dashboard_core::{
    Bar, CompanyProfile, IndicatorSnapshot, MarketData, SymbolOutcome, SymbolReport, TrendLabel,
    UnavailableReason,
};
use indicators::{atr, macd, rsi, sma, stochastic};

/// Stop distance below the latest close, in ATR multiples
pub const ATR_STOP_MULTIPLE: f64 = 2.0;

/// Analyzes one watchlist row at a time against a market data
/// provider. Every failure is absorbed at this boundary: callers get
/// either a complete report or a classified `Unavailable`, never a
/// partial result or a fault, so one bad symbol cannot take down the
/// rest of the page.
pub struct SymbolAnalyzer<M> {
    market: M,
}

impl<M: MarketData> SymbolAnalyzer<M> {
    pub fn new(market: M) -> Self {
        Self { market }
    }

    pub async fn analyze(&self, ticker: &str, cost_basis: Option<f64>) -> SymbolOutcome {
        match self.try_analyze(ticker, cost_basis).await {
            Ok(report) => SymbolOutcome::Report(Box::new(report)),
            Err(reason) => {
                tracing::warn!(symbol = ticker, %reason, "symbol unavailable, skipping");
                SymbolOutcome::Unavailable {
                    symbol: ticker.to_string(),
                    reason,
                }
            }
        }
    }

    async fn try_analyze(
        &self,
        ticker: &str,
        cost_basis: Option<f64>,
    ) -> Result<SymbolReport, UnavailableReason> {
        let bars = self
            .market
            .daily_bars(ticker)
            .await
            .map_err(|e| UnavailableReason::MarketData(e.to_string()))?;

        if bars.is_empty() {
            return Err(UnavailableReason::EmptySeries);
        }

        let profile = self
            .market
            .company_profile(ticker)
            .await
            .map_err(|e| UnavailableReason::MarketData(e.to_string()))?;

        build_report(ticker, bars, &profile, cost_basis)
    }
}

/// Pure back half of the pipeline: bars + profile in, report out.
/// Split from the fetching so the arithmetic is testable offline.
pub fn build_report(
    ticker: &str,
    bars: Vec<Bar>,
    profile: &CompanyProfile,
    cost_basis: Option<f64>,
) -> Result<SymbolReport, UnavailableReason> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let latest_close = *closes.last().ok_or(UnavailableReason::EmptySeries)?;

    // Standard parameterizations throughout; only the final values
    // are kept for display
    let stoch = stochastic(&bars, 9, 3, 3);
    let macd_out = macd(&closes, 12, 26, 9);
    let indicators = IndicatorSnapshot {
        stochastic_k: latest(&stoch.k)?,
        rsi14: latest(&rsi(&closes, 14))?,
        macd_histogram: latest(&macd_out.histogram)?,
        atr14: latest(&atr(&bars, 14))?,
    };
    let sma20 = latest(&sma(&closes, 20))?;

    let valuation_model = model_for_industry(profile.industry.as_deref());
    let intrinsic = intrinsic_value(valuation_model, profile);

    let stop_loss = latest_close - ATR_STOP_MULTIPLE * indicators.atr14;

    let trend = if latest_close > sma20 {
        TrendLabel::Strong
    } else {
        TrendLabel::Weakening
    };

    let return_on_cost = cost_basis
        .filter(|cost| *cost > 0.0)
        .map(|cost| (latest_close - cost) / cost * 100.0);

    Ok(SymbolReport {
        symbol: ticker.to_string(),
        display_name: profile.short_name.clone().unwrap_or_default(),
        series: bars,
        latest_close,
        intrinsic_value: intrinsic,
        valuation_model,
        indicators,
        sma20,
        stop_loss,
        trend,
        return_on_cost,
    })
}

fn latest(series: &[f64]) -> Result<f64, UnavailableReason> {
    series
        .last()
        .copied()
        .ok_or(UnavailableReason::InsufficientHistory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use dashboard_core::{DashboardError, ValuationModel};

    fn bar(open: f64, high: f64, low: f64, close: f64, index: usize, total: usize) -> Bar {
        Bar {
            timestamp: Utc::now() - chrono::Duration::days((total - index) as i64),
            open,
            high,
            low,
            close,
            volume: 1_000_000.0,
        }
    }

    /// 59 flat bars at 540 with a 10-point daily range, then one bar
    /// closing at 550 whose true range is also exactly 10. ATR(14)
    /// comes out at 10.0 and SMA(20) at 540.5.
    fn scenario_bars() -> Vec<Bar> {
        let total = 60;
        let mut bars: Vec<Bar> = (0..total - 1)
            .map(|i| bar(540.0, 545.0, 535.0, 540.0, i, total))
            .collect();
        bars.push(bar(540.0, 550.0, 540.0, 550.0, total - 1, total));
        bars
    }

    fn tsmc_profile() -> CompanyProfile {
        CompanyProfile {
            symbol: "2330.TW".to_string(),
            short_name: Some("TSMC".to_string()),
            industry: Some("Semiconductors".to_string()),
            trailing_eps: Some(32.0),
            trailing_pe: Some(18.5),
            book_value: Some(120.0),
        }
    }

    #[test]
    fn uptrend_close_with_cost_basis() {
        let report = build_report("2330.TW", scenario_bars(), &tsmc_profile(), Some(500.0)).unwrap();

        assert_eq!(report.latest_close, 550.0);
        assert!((report.indicators.atr14 - 10.0).abs() < 1e-9);
        assert!((report.stop_loss - 530.0).abs() < 1e-9);
        assert_eq!(report.trend, TrendLabel::Strong);
        assert!((report.return_on_cost.unwrap() - 10.0).abs() < 1e-9);
        // 550 is not below the 530 stop; the banner predicate is
        // checked at the presentation layer
        assert!(report.latest_close >= report.stop_loss);
    }

    #[test]
    fn stop_loss_is_computed_without_a_cost_basis() {
        let report = build_report("2330.TW", scenario_bars(), &tsmc_profile(), None).unwrap();

        assert!((report.stop_loss - 530.0).abs() < 1e-9);
        assert_eq!(report.return_on_cost, None);
    }

    #[test]
    fn non_positive_cost_basis_is_ignored() {
        let report = build_report("2330.TW", scenario_bars(), &tsmc_profile(), Some(0.0)).unwrap();

        assert_eq!(report.return_on_cost, None);
    }

    #[test]
    fn flat_series_classifies_as_weakening() {
        // Latest close equal to the 20-day average is not "strong"
        let total = 40;
        let flat: Vec<Bar> = (0..total)
            .map(|i| bar(100.0, 100.0, 100.0, 100.0, i, total))
            .collect();

        let report = build_report("FLAT", flat, &tsmc_profile(), None).unwrap();
        assert_eq!(report.latest_close, report.sma20);
        assert_eq!(report.trend, TrendLabel::Weakening);
    }

    #[test]
    fn bank_industry_prices_off_book_value() {
        let profile = CompanyProfile {
            symbol: "XYZ".to_string(),
            industry: Some("Regional Banks".to_string()),
            book_value: Some(20.0),
            ..Default::default()
        };

        let report = build_report("XYZ", scenario_bars(), &profile, None).unwrap();
        assert_eq!(report.valuation_model, ValuationModel::PriceToBook);
        assert_eq!(report.intrinsic_value, Some(26.0));
    }

    #[test]
    fn short_history_is_classified_not_fatal() {
        let total = 10;
        let short: Vec<Bar> = (0..total)
            .map(|i| bar(100.0, 101.0, 99.0, 100.0, i, total))
            .collect();

        let err = build_report("NEW", short, &tsmc_profile(), None).unwrap_err();
        assert_eq!(err, UnavailableReason::InsufficientHistory);
    }

    struct StubMarket {
        bars: Vec<Bar>,
        profile_fails: bool,
    }

    #[async_trait]
    impl MarketData for StubMarket {
        async fn daily_bars(&self, _symbol: &str) -> Result<Vec<Bar>, DashboardError> {
            Ok(self.bars.clone())
        }

        async fn company_profile(&self, symbol: &str) -> Result<CompanyProfile, DashboardError> {
            if self.profile_fails {
                Err(DashboardError::MarketData("profile fetch failed".to_string()))
            } else {
                Ok(CompanyProfile {
                    symbol: symbol.to_string(),
                    ..tsmc_profile()
                })
            }
        }
    }

    #[tokio::test]
    async fn empty_series_yields_the_unavailable_sentinel() {
        let analyzer = SymbolAnalyzer::new(StubMarket {
            bars: vec![],
            profile_fails: false,
        });

        match analyzer.analyze("GONE", None).await {
            SymbolOutcome::Unavailable { symbol, reason } => {
                assert_eq!(symbol, "GONE");
                assert_eq!(reason, UnavailableReason::EmptySeries);
            }
            SymbolOutcome::Report(_) => panic!("expected unavailable"),
        }
    }

    #[tokio::test]
    async fn profile_failure_is_absorbed_at_the_boundary() {
        let analyzer = SymbolAnalyzer::new(StubMarket {
            bars: scenario_bars(),
            profile_fails: true,
        });

        match analyzer.analyze("2330.TW", Some(500.0)).await {
            SymbolOutcome::Unavailable { reason, .. } => {
                assert!(matches!(reason, UnavailableReason::MarketData(_)));
            }
            SymbolOutcome::Report(_) => panic!("expected unavailable"),
        }
    }

    #[tokio::test]
    async fn healthy_fetch_produces_a_full_report() {
        let analyzer = SymbolAnalyzer::new(StubMarket {
            bars: scenario_bars(),
            profile_fails: false,
        });

        let outcome = analyzer.analyze("2330.TW", Some(500.0)).await;
        let report = outcome.as_report().expect("expected report");
        assert_eq!(report.display_name, "TSMC");
        assert_eq!(report.series.len(), 60);
    }
}
