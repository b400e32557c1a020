pub mod analysis;
pub mod domain;
pub mod error;
pub mod export;
pub mod ingest;
pub mod risk;
pub mod time;

pub use error::RiskError;

pub mod config {
    use crate::risk::decision::DecisionThresholds;
    use anyhow::Context;

    const DEFAULT_PROVIDER_BASE_URL: &str = "https://query1.finance.yahoo.com";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_LOOKBACK_YEARS: u32 = 5;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub price_provider_base_url: String,
        pub price_provider_timeout_secs: u64,
        pub lookback_years: u32,
        pub thresholds: DecisionThresholds,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let price_provider_base_url = std::env::var("PRICE_PROVIDER_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PROVIDER_BASE_URL.to_string());

            let price_provider_timeout_secs = match std::env::var("PRICE_PROVIDER_TIMEOUT_SECS") {
                Ok(s) => s
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("PRICE_PROVIDER_TIMEOUT_SECS is not a number: {s}"))?,
                Err(_) => DEFAULT_TIMEOUT_SECS,
            };

            let lookback_years = match std::env::var("LOOKBACK_YEARS") {
                Ok(s) => s
                    .trim()
                    .parse::<u32>()
                    .with_context(|| format!("LOOKBACK_YEARS is not a number: {s}"))?,
                Err(_) => DEFAULT_LOOKBACK_YEARS,
            };

            let settings = Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                price_provider_base_url,
                price_provider_timeout_secs,
                lookback_years,
                thresholds: DecisionThresholds::from_env()?,
            };
            settings.validate()?;
            Ok(settings)
        }

        pub fn with_lookback_years(mut self, years: u32) -> anyhow::Result<Self> {
            self.lookback_years = years;
            self.validate()?;
            Ok(self)
        }

        fn validate(&self) -> anyhow::Result<()> {
            anyhow::ensure!(
                (1..=30).contains(&self.lookback_years),
                "lookback years must be 1..=30 (got {})",
                self.lookback_years
            );
            anyhow::ensure!(
                self.price_provider_timeout_secs > 0,
                "PRICE_PROVIDER_TIMEOUT_SECS must be > 0"
            );
            Ok(())
        }
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                sentry_dsn: None,
                price_provider_base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
                price_provider_timeout_secs: DEFAULT_TIMEOUT_SECS,
                lookback_years: DEFAULT_LOOKBACK_YEARS,
                thresholds: DecisionThresholds::default(),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn rejects_out_of_range_lookback() {
            let res = Settings::default().with_lookback_years(0);
            assert!(res.is_err());
            let res = Settings::default().with_lookback_years(31);
            assert!(res.is_err());
            let ok = Settings::default().with_lookback_years(10).unwrap();
            assert_eq!(ok.lookback_years, 10);
        }
    }
}
