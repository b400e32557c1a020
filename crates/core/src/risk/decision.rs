use crate::domain::report::DecisionLabel;
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Cut-offs for the three-way decision. Defaults reproduce the reference behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionThresholds {
    /// Sharpe must exceed this for `Favorable`.
    pub sharpe_favorable_min: f64,
    /// Max drawdown must exceed this for `Favorable`.
    pub drawdown_favorable_min: f64,
    /// Sharpe must be below this for `HighRisk`.
    pub sharpe_high_risk_max: f64,
    /// Max drawdown must be below this for `HighRisk`.
    pub drawdown_high_risk_max: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            sharpe_favorable_min: 1.0,
            drawdown_favorable_min: -0.2,
            sharpe_high_risk_max: 0.5,
            drawdown_high_risk_max: -0.4,
        }
    }
}

impl DecisionThresholds {
    pub fn from_env() -> anyhow::Result<Self> {
        let mut out = Self::default();

        if let Some(v) = env_f64("DECISION_SHARPE_FAVORABLE_MIN")? {
            out.sharpe_favorable_min = v;
        }
        if let Some(v) = env_f64("DECISION_DRAWDOWN_FAVORABLE_MIN")? {
            out.drawdown_favorable_min = v;
        }
        if let Some(v) = env_f64("DECISION_SHARPE_HIGH_RISK_MAX")? {
            out.sharpe_high_risk_max = v;
        }
        if let Some(v) = env_f64("DECISION_DRAWDOWN_HIGH_RISK_MAX")? {
            out.drawdown_high_risk_max = v;
        }

        Ok(out)
    }

    /// First matching rule wins; `Moderate` catches everything else, NaN included.
    pub fn classify(&self, sharpe: f64, max_drawdown: f64) -> DecisionLabel {
        if sharpe > self.sharpe_favorable_min && max_drawdown > self.drawdown_favorable_min {
            DecisionLabel::Favorable
        } else if sharpe < self.sharpe_high_risk_max && max_drawdown < self.drawdown_high_risk_max
        {
            DecisionLabel::HighRisk
        } else {
            DecisionLabel::Moderate
        }
    }
}

/// Classify with the default thresholds.
pub fn decide(sharpe: f64, max_drawdown: f64) -> DecisionLabel {
    DecisionThresholds::default().classify(sharpe, max_drawdown)
}

fn env_f64(key: &str) -> anyhow::Result<Option<f64>> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let v = raw
        .parse::<f64>()
        .with_context(|| format!("{key} is not a number: {raw}"))?;
    anyhow::ensure!(v.is_finite(), "{key} must be finite (got {raw})");
    Ok(Some(v))
}
