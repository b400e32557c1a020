use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use stockrisk_core::analysis::RiskAnalyzer;
use stockrisk_core::ingest::YahooChartProvider;
use stockrisk_core::RiskError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

#[derive(Debug, Parser)]
#[command(name = "stockrisk_cli", about = "Risk metrics for one stock ticker")]
struct Args {
    /// Ticker symbol, case-insensitive (e.g. AAPL).
    ticker: String,

    /// Save the results as a one-row CSV file (".csv" is appended when missing).
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Years of daily history to analyze. Overrides LOOKBACK_YEARS.
    #[arg(long)]
    lookback_years: Option<u32>,

    /// Print the full analysis as JSON instead of the text summary.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut settings = stockrisk_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    if let Some(years) = args.lookback_years {
        settings = settings.with_lookback_years(years)?;
    }

    let provider = YahooChartProvider::from_settings(&settings)?;
    let analyzer = RiskAnalyzer::from_settings(Arc::new(provider), &settings);

    let analysis = match analyzer.analyze(&args.ticker).await {
        Ok(analysis) => analysis,
        Err(err) => {
            let report = reportable(&err);
            let err = anyhow::Error::new(err);
            if report {
                sentry_anyhow::capture_anyhow(&err);
            }
            tracing::error!(ticker = %args.ticker, error = %err, "analysis failed");
            return Err(err.context(format!("could not analyze {}", args.ticker.trim())));
        }
    };

    if args.json {
        let out = serde_json::to_string_pretty(&analysis).context("serialize analysis failed")?;
        println!("{out}");
    } else {
        print!("{}", render::summary(&analysis));
    }

    if let Some(path) = args.output.as_deref() {
        match stockrisk_core::export::save_report(path, &analysis.report) {
            Ok(saved) => eprintln!("Results saved to {}", saved.display()),
            Err(err) => {
                let err = anyhow::Error::new(err);
                sentry_anyhow::capture_anyhow(&err);
                return Err(err.context("could not save results"));
            }
        }
    }

    Ok(())
}

/// Operator mistakes and degenerate inputs are not worth an incident.
fn reportable(err: &RiskError) -> bool {
    matches!(
        err,
        RiskError::DataUnavailable(_) | RiskError::ExportFailure(_)
    )
}

fn init_sentry(settings: &stockrisk_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
