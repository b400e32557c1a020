pub mod decision;
pub mod metrics;
pub mod stats;

use crate::domain::price::PriceSeries;
use crate::domain::report::RiskReport;
use crate::error::RiskError;
use decision::DecisionThresholds;

pub use decision::decide;
pub use metrics::{
    compute_returns, conditional_var_95, historical_var, max_drawdown, sharpe_ratio,
    sortino_ratio, value_at_risk_95, volatility, ReturnSeries,
};

/// Compute every metric for one price series. The first undefined metric aborts the report.
pub fn analyze(
    prices: &PriceSeries,
    thresholds: &DecisionThresholds,
) -> Result<RiskReport, RiskError> {
    let returns = compute_returns(prices);
    let returns = returns.as_slice();
    if returns.iter().any(|r| !r.is_finite()) {
        return Err(RiskError::degenerate(
            "returns",
            "price changes overflow the floating-point range",
        ));
    }

    let var_95 = finite("value at risk", value_at_risk_95(returns)?)?;
    let cvar_95 = finite(
        "conditional value at risk",
        conditional_var_95(returns, var_95)?,
    )?;
    let volatility = finite("volatility", volatility(returns)?)?;
    let sharpe_ratio = finite("sharpe ratio", sharpe_ratio(returns)?)?;
    let sortino_ratio = finite("sortino ratio", sortino_ratio(returns)?)?;
    let max_drawdown = finite("max drawdown", max_drawdown(prices))?;
    let decision = thresholds.classify(sharpe_ratio, max_drawdown);

    Ok(RiskReport {
        var_95,
        cvar_95,
        volatility,
        sharpe_ratio,
        sortino_ratio,
        max_drawdown,
        decision,
    })
}

fn finite(metric: &'static str, value: f64) -> Result<f64, RiskError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RiskError::degenerate(
            metric,
            "result overflows the floating-point range",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PricePoint;
    use crate::domain::report::DecisionLabel;
    use chrono::{Duration, NaiveDate};

    fn series(prices: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
        PriceSeries::new(
            prices
                .iter()
                .enumerate()
                .map(|(i, &price)| PricePoint {
                    date: start + Duration::days(i as i64),
                    price,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn report_matches_individual_metrics() {
        let prices = series(&[100.0, 102.0, 101.0, 105.0, 95.0, 97.0, 99.0, 96.0]);
        let report = analyze(&prices, &DecisionThresholds::default()).unwrap();

        let returns = compute_returns(&prices);
        let r = returns.as_slice();
        assert_eq!(report.var_95, value_at_risk_95(r).unwrap());
        assert_eq!(report.cvar_95, conditional_var_95(r, report.var_95).unwrap());
        assert_eq!(report.volatility, volatility(r).unwrap());
        assert_eq!(report.sharpe_ratio, sharpe_ratio(r).unwrap());
        assert_eq!(report.sortino_ratio, sortino_ratio(r).unwrap());
        assert_eq!(report.max_drawdown, max_drawdown(&prices));
        assert_eq!(
            report.decision,
            decide(report.sharpe_ratio, report.max_drawdown)
        );
        assert!(report.max_drawdown <= 0.0);
        assert!(report.volatility >= 0.0);
        assert!(report.cvar_95 <= report.var_95);
    }

    #[test]
    fn deep_losses_classify_as_high_risk() {
        let prices = series(&[100.0, 90.0, 95.0, 70.0, 72.0, 50.0, 52.0, 45.0]);
        let report = analyze(&prices, &DecisionThresholds::default()).unwrap();
        assert!(report.max_drawdown < -0.4);
        assert!(report.sharpe_ratio < 0.5);
        assert_eq!(report.decision, DecisionLabel::HighRisk);
    }

    #[test]
    fn increasing_series_fails_on_missing_downside() {
        let prices = series(&[10.0, 11.0, 12.5, 13.0]);
        assert_eq!(max_drawdown(&prices), 0.0);
        let res = analyze(&prices, &DecisionThresholds::default());
        assert!(matches!(
            res,
            Err(RiskError::DegenerateDistribution { metric: "sortino ratio", .. })
        ));
    }

    #[test]
    fn flat_series_fails_on_sharpe() {
        let res = analyze(&series(&[20.0, 20.0]), &DecisionThresholds::default());
        assert!(matches!(
            res,
            Err(RiskError::DegenerateDistribution { metric: "sharpe ratio", .. })
        ));
    }

    #[test]
    fn overflowing_returns_are_rejected() {
        let prices = series(&[1e-200, 1e200, 1e-200, 1e200, 5e-201, 1e-201]);
        let res = analyze(&prices, &DecisionThresholds::default());
        assert!(matches!(
            res,
            Err(RiskError::DegenerateDistribution { metric: "returns", .. })
        ));
    }

    #[test]
    fn overflowing_variance_is_rejected() {
        // Returns stay finite (1e300, -1, 1e300) but their squared deviations do not.
        let prices = series(&[1e-100, 1e200, 1e-100, 1e200]);
        let res = analyze(&prices, &DecisionThresholds::default());
        assert!(matches!(
            res,
            Err(RiskError::DegenerateDistribution { metric: "volatility", .. })
        ));
    }
}
