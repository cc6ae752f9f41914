use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use scrape_core::{RunReport, ScrapingJob};
use scrape_prometheus::{CONTENT_TYPE, Registry, render};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Clone)]
struct AppState {
    registry: Registry,
    job: ScrapingJob,
}

/// Routes:
/// - GET /metrics - Prometheus text exposition
/// - GET /health - job state and last run
pub fn router(registry: Registry, job: ScrapingJob) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/health", get(health))
        .with_state(AppState { registry, job })
}

pub async fn serve(listener: TcpListener, router: Router, shutdown: CancellationToken) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "serving /metrics");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    job: String,
    state: &'static str,
    runs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_run: Option<LastRun>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LastRun {
    run_id: String,
    outcome: &'static str,
    definitions: usize,
    batches: Option<usize>,
    timed_out: bool,
    duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<RunReport> for LastRun {
    fn from(r: RunReport) -> Self {
        Self {
            run_id: r.run_id.to_string(),
            outcome: r.outcome.as_str(),
            definitions: r.definitions,
            batches: r.batches,
            timed_out: r.timed_out,
            duration_ms: u64::try_from(r.duration.as_millis()).unwrap_or(u64::MAX),
            error: r.error,
        }
    }
}

/// GET /metrics
async fn metrics(State(state): State<AppState>) -> Response {
    match render(&state.registry) {
        Ok(body) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            warn!(error = %e, "failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let run_state = state.job.state();
    Json(HealthResponse {
        job: state.job.name().to_string(),
        state: run_state.current().as_str(),
        runs: run_state.runs(),
        last_run: run_state.last_report().map(LastRun::from),
    })
}
