use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionLabel {
    Favorable,
    Moderate,
    HighRisk,
}

impl DecisionLabel {
    pub fn explanation(self) -> &'static str {
        match self {
            DecisionLabel::Favorable => {
                "This stock has a good risk-adjusted return and moderate drawdown. Likely a good investment."
            }
            DecisionLabel::Moderate => {
                "Moderate risk-return profile. Evaluate other factors before investing."
            }
            DecisionLabel::HighRisk => {
                "High drawdown and poor risk-adjusted returns. Consider this a high-risk investment."
            }
        }
    }
}

impl fmt::Display for DecisionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecisionLabel::Favorable => "Favorable",
            DecisionLabel::Moderate => "Moderate",
            DecisionLabel::HighRisk => "High risk",
        };
        f.write_str(s)
    }
}

/// Six risk metrics over one price series plus the derived decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub var_95: f64,
    pub cvar_95: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub decision: DecisionLabel,
}

/// Display strings for a report: four decimal places, decision as its explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedReport {
    pub var_95: String,
    pub cvar_95: String,
    pub volatility: String,
    pub sharpe_ratio: String,
    pub sortino_ratio: String,
    pub max_drawdown: String,
    pub decision: String,
}

impl RiskReport {
    pub fn formatted(&self) -> FormattedReport {
        FormattedReport {
            var_95: format_metric(self.var_95),
            cvar_95: format_metric(self.cvar_95),
            volatility: format_metric(self.volatility),
            sharpe_ratio: format_metric(self.sharpe_ratio),
            sortino_ratio: format_metric(self.sortino_ratio),
            max_drawdown: format_metric(self.max_drawdown),
            decision: self.decision.explanation().to_string(),
        }
    }
}

pub fn format_metric(value: f64) -> String {
    format!("{value:.4}")
}
