use thiserror::Error;

/// Failure taxonomy for one analysis request. Every variant is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiskError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("price data unavailable: {0}")]
    DataUnavailable(String),

    #[error("insufficient price history: need at least {required} points, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("{metric} is undefined: {reason}")]
    DegenerateDistribution {
        metric: &'static str,
        reason: &'static str,
    },

    #[error("export failed: {0}")]
    ExportFailure(String),
}

impl RiskError {
    /// Stable machine-readable name, used by the HTTP surface.
    pub fn kind(&self) -> &'static str {
        match self {
            RiskError::InvalidInput(_) => "invalid_input",
            RiskError::DataUnavailable(_) => "data_unavailable",
            RiskError::InsufficientHistory { .. } => "insufficient_history",
            RiskError::DegenerateDistribution { .. } => "degenerate_distribution",
            RiskError::ExportFailure(_) => "export_failure",
        }
    }

    pub(crate) fn degenerate(metric: &'static str, reason: &'static str) -> Self {
        RiskError::DegenerateDistribution { metric, reason }
    }
}
