use crate::config::Settings;
use crate::domain::price::Ticker;
use crate::error::RiskError;
use crate::ingest::types::{ChartEnvelope, PriceHistory};
use crate::time::window::LookbackWindow;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{StatusCode, Url};
use std::time::Duration;

const CLIENT_USER_AGENT: &str = concat!("stockrisk/", env!("CARGO_PKG_VERSION"));

/// Source of daily closing prices. Any failure is reported as `DataUnavailable`
/// (or `InsufficientHistory` when fewer than two prices come back).
#[async_trait::async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_daily_closes(
        &self,
        ticker: &Ticker,
        window: LookbackWindow,
    ) -> Result<PriceHistory, RiskError>;
}

/// Yahoo Finance v8 chart endpoint.
#[derive(Debug, Clone)]
pub struct YahooChartProvider {
    http: reqwest::Client,
    base_url: Url,
}

impl YahooChartProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = Url::parse(&settings.price_provider_base_url).with_context(|| {
            format!(
                "PRICE_PROVIDER_BASE_URL is not a valid URL: {}",
                settings.price_provider_base_url
            )
        })?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "PRICE_PROVIDER_BASE_URL cannot be used as a base: {base_url}"
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.price_provider_timeout_secs))
            .default_headers(default_headers())
            .build()
            .context("failed to build price provider http client")?;

        Ok(Self { http, base_url })
    }

    fn chart_url(&self, ticker: &Ticker) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("price provider base url cannot be a base"))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", ticker.as_str()]);
        Ok(url)
    }

    async fn fetch_chart(&self, ticker: &Ticker, window: LookbackWindow) -> Result<ChartEnvelope> {
        let url = self.chart_url(ticker)?;
        let (period1, period2) = window.unix_bounds();

        let res = self
            .http
            .get(url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div,split".to_string()),
            ])
            .send()
            .await
            .context("price provider request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read price provider response")?;

        parse_chart_response(status, &text)
    }
}

/// Combine status and body. Error statuses still carry a chart.error payload worth surfacing.
fn parse_chart_response(status: StatusCode, text: &str) -> Result<ChartEnvelope> {
    match serde_json::from_str::<ChartEnvelope>(text) {
        Ok(parsed) if status.is_success() || parsed.chart.error.is_some() => Ok(parsed),
        Ok(_) => anyhow::bail!("price provider HTTP {status}"),
        Err(err) if status.is_success() => {
            Err(err).context("failed to parse price provider response")
        }
        Err(_) => anyhow::bail!("price provider HTTP {status}: {}", truncate(text, 200)),
    }
}

#[async_trait::async_trait]
impl PriceHistoryProvider for YahooChartProvider {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_daily_closes(
        &self,
        ticker: &Ticker,
        window: LookbackWindow,
    ) -> Result<PriceHistory, RiskError> {
        let envelope = self.fetch_chart(ticker, window).await.map_err(|err| {
            tracing::warn!(%ticker, error = %format!("{err:#}"), "price history fetch failed");
            RiskError::DataUnavailable(format!("{ticker}: {err:#}"))
        })?;

        let history = envelope.into_history(ticker)?;
        tracing::debug!(
            %ticker,
            column = ?history.column,
            points = history.series.len(),
            "fetched price history"
        );
        Ok(history)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
