use crate::domain::price::{PriceColumn, PricePoint, PriceSeries, Ticker};
use crate::error::RiskError;
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Daily closes for one ticker as returned by a provider.
#[derive(Debug, Clone, Serialize)]
pub struct PriceHistory {
    pub ticker: Ticker,
    pub column: PriceColumn,
    pub currency: Option<String>,
    pub series: PriceSeries,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    pub chart: ChartBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartBody {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    #[serde(default)]
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartMeta {
    #[serde(default)]
    pub currency: Option<String>,
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<QuoteBlock>,
    #[serde(default)]
    pub adjclose: Vec<AdjCloseBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteBlock {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdjCloseBlock {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

impl ChartEnvelope {
    /// Turn a chart payload into a validated history, preferring adjusted closes.
    pub fn into_history(self, ticker: &Ticker) -> Result<PriceHistory, RiskError> {
        if let Some(err) = self.chart.error {
            return Err(RiskError::DataUnavailable(format!(
                "{ticker}: {} ({})",
                err.description, err.code
            )));
        }

        let result = self
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| RiskError::DataUnavailable(format!("{ticker}: no data returned")))?;

        let currency = result.meta.currency.clone();
        let (column, points) = result.into_points(ticker)?;
        if points.is_empty() {
            return Err(RiskError::DataUnavailable(format!(
                "{ticker}: no usable prices returned"
            )));
        }

        Ok(PriceHistory {
            ticker: ticker.clone(),
            column,
            currency,
            series: PriceSeries::new(points)?,
        })
    }
}

impl ChartResult {
    fn into_points(self, ticker: &Ticker) -> Result<(PriceColumn, Vec<PricePoint>), RiskError> {
        let adjclose = self
            .indicators
            .adjclose
            .into_iter()
            .next()
            .map(|b| b.adjclose)
            .filter(|v| v.iter().any(Option::is_some));
        let close = self
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|b| b.close)
            .filter(|v| v.iter().any(Option::is_some));

        let (column, values) = match (adjclose, close) {
            (Some(v), _) => (PriceColumn::AdjClose, v),
            (None, Some(v)) => (PriceColumn::Close, v),
            (None, None) => {
                return Err(RiskError::DataUnavailable(format!(
                    "{ticker}: stock data is missing required price columns"
                )))
            }
        };

        if values.len() != self.timestamp.len() {
            return Err(RiskError::DataUnavailable(format!(
                "{ticker}: {} timestamps but {} prices",
                self.timestamp.len(),
                values.len()
            )));
        }

        let mut points: Vec<PricePoint> = Vec::with_capacity(values.len());
        for (ts, value) in self.timestamp.into_iter().zip(values) {
            let Some(price) = value.filter(|p| p.is_finite()) else {
                continue;
            };
            let date = DateTime::from_timestamp(ts + self.meta.gmtoffset, 0)
                .ok_or_else(|| {
                    RiskError::DataUnavailable(format!("{ticker}: invalid timestamp {ts}"))
                })?
                .date_naive();

            // Intraday refreshes can repeat the latest session; keep the newer row.
            match points.last_mut() {
                Some(last) if last.date == date => last.price = price,
                _ => points.push(PricePoint { date, price }),
            }
        }

        Ok((column, points))
    }
}
