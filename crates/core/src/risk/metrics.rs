use super::stats::{is_constant, mean, quantile, sample_std_dev};
use crate::domain::price::{PriceSeries, MIN_PRICE_POINTS};
use crate::error::RiskError;

pub const VAR_CONFIDENCE_95: f64 = 0.95;

/// Simple returns between adjacent prices, in series order. Length is `prices.len() - 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries(Vec<f64>);

impl ReturnSeries {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn compute_returns(prices: &PriceSeries) -> ReturnSeries {
    let returns = prices
        .points()
        .windows(2)
        .map(|w| (w[1].price - w[0].price) / w[0].price)
        .collect();
    ReturnSeries(returns)
}

fn require_returns(returns: &[f64]) -> Result<(), RiskError> {
    if returns.is_empty() {
        return Err(RiskError::InsufficientHistory {
            required: MIN_PRICE_POINTS,
            actual: MIN_PRICE_POINTS - 1,
        });
    }
    Ok(())
}

/// Historical VaR: the `(1 - confidence)` empirical quantile of the returns.
/// Negative when the tail is loss-making.
pub fn historical_var(returns: &[f64], confidence: f64) -> Result<f64, RiskError> {
    require_returns(returns)?;
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(RiskError::InvalidInput(format!(
            "confidence must be in (0, 1) (got {confidence})"
        )));
    }
    quantile(returns, 1.0 - confidence)
        .ok_or_else(|| RiskError::degenerate("value at risk", "quantile is undefined"))
}

pub fn value_at_risk_95(returns: &[f64]) -> Result<f64, RiskError> {
    historical_var(returns, VAR_CONFIDENCE_95)
}

/// Mean of the returns at or below `var_95`.
pub fn conditional_var_95(returns: &[f64], var_95: f64) -> Result<f64, RiskError> {
    require_returns(returns)?;
    let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= var_95).collect();
    mean(&tail).ok_or_else(|| {
        RiskError::degenerate(
            "conditional value at risk",
            "no returns at or below the value at risk",
        )
    })
}

/// Sample standard deviation of returns. Identical returns (a single one included) give 0.
pub fn volatility(returns: &[f64]) -> Result<f64, RiskError> {
    require_returns(returns)?;
    if is_constant(returns) {
        return Ok(0.0);
    }
    sample_std_dev(returns)
        .ok_or_else(|| RiskError::degenerate("volatility", "fewer than two returns"))
}

pub fn sharpe_ratio(returns: &[f64]) -> Result<f64, RiskError> {
    require_returns(returns)?;
    if is_constant(returns) {
        return Err(RiskError::degenerate(
            "sharpe ratio",
            "returns have zero variance",
        ));
    }
    let avg = mean(returns).ok_or_else(|| RiskError::degenerate("sharpe ratio", "no returns"))?;
    let std = sample_std_dev(returns)
        .ok_or_else(|| RiskError::degenerate("sharpe ratio", "fewer than two returns"))?;
    if std == 0.0 {
        return Err(RiskError::degenerate(
            "sharpe ratio",
            "returns have zero variance",
        ));
    }
    Ok(avg / std)
}

/// Mean return over the sample standard deviation of the strictly negative returns.
pub fn sortino_ratio(returns: &[f64]) -> Result<f64, RiskError> {
    require_returns(returns)?;
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    if downside.is_empty() {
        return Err(RiskError::degenerate(
            "sortino ratio",
            "no negative returns observed",
        ));
    }
    if downside.len() < 2 {
        return Err(RiskError::degenerate(
            "sortino ratio",
            "downside deviation needs at least two negative returns",
        ));
    }
    if is_constant(&downside) {
        return Err(RiskError::degenerate(
            "sortino ratio",
            "negative returns have zero variance",
        ));
    }

    let avg = mean(returns).ok_or_else(|| RiskError::degenerate("sortino ratio", "no returns"))?;
    let downside_std = sample_std_dev(&downside).ok_or_else(|| {
        RiskError::degenerate("sortino ratio", "downside deviation is undefined")
    })?;
    if downside_std == 0.0 {
        return Err(RiskError::degenerate(
            "sortino ratio",
            "negative returns have zero variance",
        ));
    }
    Ok(avg / downside_std)
}

/// Worst peak-to-trough decline against the running maximum. Always <= 0.
pub fn max_drawdown(prices: &PriceSeries) -> f64 {
    let mut running_max = f64::MIN;
    let mut worst = 0.0_f64;
    for point in prices.points() {
        running_max = running_max.max(point.price);
        let drawdown = (point.price - running_max) / running_max;
        worst = worst.min(drawdown);
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PricePoint;
    use chrono::{Duration, NaiveDate};

    fn series(prices: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                date: start + Duration::days(i as i64),
                price,
            })
            .collect();
        PriceSeries::new(points).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn returns_follow_adjacent_prices() {
        let prices = series(&[100.0, 102.0, 101.0, 105.0, 95.0]);
        let returns = compute_returns(&prices);
        assert_eq!(returns.len(), prices.len() - 1);

        let p = prices.prices();
        for (i, r) in returns.as_slice().iter().enumerate() {
            assert_eq!(*r, (p[i + 1] - p[i]) / p[i]);
        }
        assert!(approx(returns.as_slice()[0], 0.02));
        assert!(approx(returns.as_slice()[1], -1.0 / 102.0));
        assert!(approx(returns.as_slice()[2], 4.0 / 101.0));
        assert!(approx(returns.as_slice()[3], -10.0 / 105.0));
    }

    #[test]
    fn drawdown_uses_running_peak() {
        let prices = series(&[100.0, 102.0, 101.0, 105.0, 95.0]);
        let dd = max_drawdown(&prices);
        assert!(approx(dd, -10.0 / 105.0));
    }

    #[test]
    fn drawdown_is_zero_for_non_decreasing_prices() {
        assert_eq!(max_drawdown(&series(&[10.0, 11.0, 11.0, 12.5])), 0.0);
        assert_eq!(max_drawdown(&series(&[10.0, 10.0])), 0.0);
        assert!(max_drawdown(&series(&[10.0, 9.99])) < 0.0);
    }

    #[test]
    fn drawdown_picks_deepest_trough_not_global_extremes() {
        // Peak 120 -> trough 90 (-25%) precedes the global minimum 80 from peak 100 (-20%).
        let prices = series(&[100.0, 80.0, 120.0, 90.0, 130.0]);
        assert!(approx(max_drawdown(&prices), -0.25));
    }

    #[test]
    fn var_is_interpolated_fifth_percentile() {
        let returns: Vec<f64> = (0..21).map(|i| (i as f64 - 10.0) / 100.0).collect();
        // pos = 0.05 * 20 = 1.0 -> second smallest
        assert!(approx(value_at_risk_95(&returns).unwrap(), -0.09));

        let returns = [0.02, -0.01, 0.04, -0.1];
        // sorted [-0.1, -0.01, 0.02, 0.04], pos = 0.15 -> -0.1 + 0.09 * 0.15
        assert!(approx(value_at_risk_95(&returns).unwrap(), -0.0865));
    }

    #[test]
    fn cvar_averages_the_tail() {
        let returns: Vec<f64> = (0..21).map(|i| (i as f64 - 10.0) / 100.0).collect();
        let var = value_at_risk_95(&returns).unwrap();
        let cvar = conditional_var_95(&returns, var).unwrap();
        assert!(approx(cvar, -0.095));
        assert!(cvar <= var);
    }

    #[test]
    fn cvar_with_empty_tail_is_degenerate() {
        let res = conditional_var_95(&[0.01, 0.02], -0.5);
        assert!(matches!(
            res,
            Err(RiskError::DegenerateDistribution { .. })
        ));
    }

    #[test]
    fn volatility_is_sample_std() {
        let returns = [0.01, -0.02, 0.03, 0.0];
        let v = volatility(&returns).unwrap();
        let m = 0.005;
        let expected = (((0.01f64 - m).powi(2)
            + (-0.02f64 - m).powi(2)
            + (0.03f64 - m).powi(2)
            + (0.0f64 - m).powi(2))
            / 3.0)
            .sqrt();
        assert!(approx(v, expected));
        assert!(v > 0.0);
        assert_eq!(volatility(&[0.01, 0.01, 0.01]).unwrap(), 0.0);
    }

    #[test]
    fn sharpe_and_sortino_on_mixed_returns() {
        let returns = [0.02, -0.01, 0.03, -0.03, 0.01];
        let sharpe = sharpe_ratio(&returns).unwrap();
        let expected = 0.004 / sample_std_dev(&returns).unwrap();
        assert!(approx(sharpe, expected));

        let sortino = sortino_ratio(&returns).unwrap();
        let downside_std = sample_std_dev(&[-0.01, -0.03]).unwrap();
        assert!(approx(sortino, 0.004 / downside_std));
    }

    #[test]
    fn flat_two_point_series_is_degenerate() {
        let prices = series(&[50.0, 50.0]);
        let returns = compute_returns(&prices);
        assert_eq!(returns.as_slice(), &[0.0]);
        assert_eq!(volatility(returns.as_slice()).unwrap(), 0.0);
        assert!(matches!(
            sharpe_ratio(returns.as_slice()),
            Err(RiskError::DegenerateDistribution { metric: "sharpe ratio", .. })
        ));
        assert!(matches!(
            sortino_ratio(returns.as_slice()),
            Err(RiskError::DegenerateDistribution { metric: "sortino ratio", .. })
        ));
    }

    #[test]
    fn sortino_without_downside_is_degenerate() {
        let returns = compute_returns(&series(&[10.0, 11.0, 12.0, 14.0]));
        assert!(matches!(
            sortino_ratio(returns.as_slice()),
            Err(RiskError::DegenerateDistribution {
                reason: "no negative returns observed",
                ..
            })
        ));
    }

    #[test]
    fn empty_returns_are_insufficient_history() {
        assert!(matches!(
            value_at_risk_95(&[]),
            Err(RiskError::InsufficientHistory { .. })
        ));
        assert!(matches!(
            volatility(&[]),
            Err(RiskError::InsufficientHistory { .. })
        ));
    }
}
