use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockrisk_core::analysis::{Analysis, RiskAnalyzer};
use stockrisk_core::ingest::YahooChartProvider;
use stockrisk_core::RiskError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stockrisk_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let provider = YahooChartProvider::from_settings(&settings)?;
    let analyzer = RiskAnalyzer::from_settings(Arc::new(provider), &settings);
    let app = router(AppState {
        analyzer: Arc::new(analyzer),
    });

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, lookback_years = settings.lookback_years, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[derive(Clone)]
struct AppState {
    analyzer: Arc<RiskAnalyzer>,
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/risk/:ticker", get(get_risk))
        .route("/risk/:ticker/export.csv", get(export_risk_csv))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn get_risk(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<Analysis>, ApiError> {
    let analysis = state.analyzer.analyze(&ticker).await?;
    Ok(Json(analysis))
}

async fn export_risk_csv(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Response, ApiError> {
    let analysis = state.analyzer.analyze(&ticker).await?;
    let body = stockrisk_core::export::report_to_string(&analysis.report)?;
    let disposition = format!(
        "attachment; filename=\"{}_risk.csv\"",
        analysis.ticker.as_str().to_ascii_lowercase()
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

#[derive(Debug)]
struct ApiError(RiskError);

impl From<RiskError> for ApiError {
    fn from(err: RiskError) -> Self {
        Self(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

fn status_for(err: &RiskError) -> StatusCode {
    match err {
        RiskError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        RiskError::DataUnavailable(_) => StatusCode::BAD_GATEWAY,
        RiskError::InsufficientHistory { .. } | RiskError::DegenerateDistribution { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RiskError::ExportFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            let err = anyhow::Error::new(self.0.clone());
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, %status, "risk request failed");
        } else {
            tracing::info!(error = %self.0, %status, "risk request rejected");
        }

        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
