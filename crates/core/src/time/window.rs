use crate::error::RiskError;
use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::Serialize;

/// Trailing calendar window of daily history, inclusive of both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LookbackWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LookbackWindow {
    pub fn trailing_years(end: NaiveDate, years: u32) -> Result<Self, RiskError> {
        if years == 0 {
            return Err(RiskError::InvalidInput(
                "lookback must be at least one year".to_string(),
            ));
        }
        // Feb 29 minus N years clamps to Feb 28.
        let start = end
            .checked_sub_months(Months::new(years.saturating_mul(12)))
            .ok_or_else(|| {
                RiskError::InvalidInput(format!("lookback of {years} years is out of range"))
            })?;
        Ok(Self { start, end })
    }

    pub fn ending_now(now_utc: DateTime<Utc>, years: u32) -> Result<Self, RiskError> {
        Self::trailing_years(now_utc.date_naive(), years)
    }

    /// Unix seconds for the start of `start` and the end of `end` (UTC).
    pub fn unix_bounds(&self) -> (i64, i64) {
        let start = self.start.and_hms_opt(0, 0, 0).map(|t| t.and_utc().timestamp());
        let end = self
            .end
            .succ_opt()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|t| t.and_utc().timestamp());
        (start.unwrap_or_default(), end.unwrap_or(i64::MAX))
    }
}
