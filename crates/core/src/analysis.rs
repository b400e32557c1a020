use crate::config::Settings;
use crate::domain::price::{PriceColumn, Ticker};
use crate::domain::report::{FormattedReport, RiskReport};
use crate::error::RiskError;
use crate::ingest::PriceHistoryProvider;
use crate::risk::{self, decision::DecisionThresholds};
use crate::time::window::LookbackWindow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Result of one analysis request, ready for a presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub ticker: Ticker,
    pub provider: &'static str,
    pub price_column: PriceColumn,
    pub currency: Option<String>,
    pub window: LookbackWindow,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub price_points: usize,
    pub report: RiskReport,
    pub formatted: FormattedReport,
}

/// Fetches history for a ticker and runs the risk engine over it.
#[derive(Clone)]
pub struct RiskAnalyzer {
    provider: Arc<dyn PriceHistoryProvider>,
    lookback_years: u32,
    thresholds: DecisionThresholds,
}

impl RiskAnalyzer {
    pub fn new(
        provider: Arc<dyn PriceHistoryProvider>,
        lookback_years: u32,
        thresholds: DecisionThresholds,
    ) -> Self {
        Self {
            provider,
            lookback_years,
            thresholds,
        }
    }

    pub fn from_settings(provider: Arc<dyn PriceHistoryProvider>, settings: &Settings) -> Self {
        Self::new(provider, settings.lookback_years, settings.thresholds)
    }

    pub async fn analyze(&self, raw_ticker: &str) -> Result<Analysis, RiskError> {
        self.analyze_at(raw_ticker, Utc::now()).await
    }

    pub async fn analyze_at(
        &self,
        raw_ticker: &str,
        now_utc: DateTime<Utc>,
    ) -> Result<Analysis, RiskError> {
        let ticker = Ticker::parse(raw_ticker)?;
        let window = LookbackWindow::ending_now(now_utc, self.lookback_years)?;

        tracing::info!(
            %ticker,
            provider = self.provider.provider_name(),
            start = %window.start,
            end = %window.end,
            "analyzing ticker"
        );

        let history = self.provider.fetch_daily_closes(&ticker, window).await?;
        let report = risk::analyze(&history.series, &self.thresholds)?;

        tracing::info!(
            %ticker,
            points = history.series.len(),
            decision = ?report.decision,
            sharpe = report.sharpe_ratio,
            max_drawdown = report.max_drawdown,
            "analysis complete"
        );

        Ok(Analysis {
            provider: self.provider.provider_name(),
            price_column: history.column,
            currency: history.currency,
            window,
            first_date: history.series.first_date(),
            last_date: history.series.last_date(),
            price_points: history.series.len(),
            formatted: report.formatted(),
            report,
            ticker,
        })
    }
}
