use crate::error::RiskError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum number of prices needed to form a single return.
pub const MIN_PRICE_POINTS: usize = 2;

/// Normalized ticker symbol (trimmed, upper-cased, never empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(raw: &str) -> Result<Self, RiskError> {
        let symbol = raw.trim().to_ascii_uppercase();
        if symbol.is_empty() {
            return Err(RiskError::InvalidInput(
                "please enter a valid stock ticker".to_string(),
            ));
        }
        if symbol.chars().any(char::is_whitespace) {
            return Err(RiskError::InvalidInput(format!(
                "ticker must not contain whitespace: {symbol:?}"
            )));
        }
        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Provider column the closing prices were taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceColumn {
    AdjClose,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Daily closing prices, strictly increasing in date, every price finite and > 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, RiskError> {
        if points.len() < MIN_PRICE_POINTS {
            return Err(RiskError::InsufficientHistory {
                required: MIN_PRICE_POINTS,
                actual: points.len(),
            });
        }

        for (idx, point) in points.iter().enumerate() {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(RiskError::DataUnavailable(format!(
                    "price on {} must be a positive finite number (got {})",
                    point.date, point.price
                )));
            }
            if idx > 0 && points[idx - 1].date >= point.date {
                return Err(RiskError::DataUnavailable(format!(
                    "price dates must be strictly increasing ({} is followed by {})",
                    points[idx - 1].date, point.date
                )));
            }
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.points[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.points[self.points.len() - 1].date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn normalizes_ticker() {
        let t = Ticker::parse("  aapl ").unwrap();
        assert_eq!(t.as_str(), "AAPL");
        assert_eq!(t.to_string(), "AAPL");
    }

    #[test]
    fn rejects_blank_ticker() {
        assert!(matches!(Ticker::parse("   "), Err(RiskError::InvalidInput(_))));
        assert!(matches!(Ticker::parse(""), Err(RiskError::InvalidInput(_))));
        assert!(matches!(Ticker::parse("BRK B"), Err(RiskError::InvalidInput(_))));
    }

    #[test]
    fn requires_two_points() {
        let res = PriceSeries::new(vec![PricePoint {
            date: day(1),
            price: 10.0,
        }]);
        assert_eq!(
            res,
            Err(RiskError::InsufficientHistory {
                required: 2,
                actual: 1
            })
        );
        assert!(matches!(
            PriceSeries::new(Vec::new()),
            Err(RiskError::InsufficientHistory { actual: 0, .. })
        ));
    }

    #[test]
    fn rejects_non_positive_and_unordered() {
        let bad_price = PriceSeries::new(vec![
            PricePoint { date: day(1), price: 10.0 },
            PricePoint { date: day(2), price: 0.0 },
        ]);
        assert!(matches!(bad_price, Err(RiskError::DataUnavailable(_))));

        let nan_price = PriceSeries::new(vec![
            PricePoint { date: day(1), price: f64::NAN },
            PricePoint { date: day(2), price: 1.0 },
        ]);
        assert!(matches!(nan_price, Err(RiskError::DataUnavailable(_))));

        let unordered = PriceSeries::new(vec![
            PricePoint { date: day(2), price: 10.0 },
            PricePoint { date: day(2), price: 11.0 },
        ]);
        assert!(matches!(unordered, Err(RiskError::DataUnavailable(_))));
    }

    #[test]
    fn exposes_prices_in_order() {
        let s = PriceSeries::new(vec![
            PricePoint { date: day(1), price: 10.0 },
            PricePoint { date: day(4), price: 12.5 },
        ])
        .unwrap();
        assert_eq!(s.prices(), vec![10.0, 12.5]);
        assert_eq!(s.first_date(), day(1));
        assert_eq!(s.last_date(), day(4));
        assert_eq!(s.len(), 2);
    }
}
