//! HTTP front door for the harvester
//!
//! `POST /api/analyze` takes `{ "url": "..." }` and answers with the harvest
//! report, `GET /healthz` is a liveness probe.

use crate::output::{AnalyzeResponse, ErrorResponse, GENERIC_FAILURE};
use crate::{HarvestError, HarvestReport, Harvester, UrlError};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
struct AppState {
    harvester: Arc<Harvester>,
    hard_limit: Duration,
}

/// Request body of the analyze endpoint
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Builds the application router around a shared harvester
pub fn router(harvester: Arc<Harvester>) -> Router {
    let hard_limit = Duration::from_secs(harvester.config().crawler.hard_limit_secs);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/analyze", post(analyze_handler))
        .with_state(AppState {
            harvester,
            hard_limit,
        })
}

/// Binds `bind` and serves until the process is stopped
pub async fn serve(harvester: Harvester, bind: &str) -> Result<(), HarvestError> {
    let app = router(Arc::new(harvester));
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Runs one harvest under the hard limit and shapes the outcome for the wire
///
/// Shared by the HTTP handler and the one-shot CLI mode so both produce the same
/// status codes and bodies.
pub async fn analyze(
    harvester: &Harvester,
    raw_url: Option<&str>,
    hard_limit: Duration,
) -> Result<AnalyzeResponse, (StatusCode, ErrorResponse)> {
    let raw_url = match raw_url.map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(UrlError::Missing.to_string()),
            ))
        }
    };

    match tokio::time::timeout(hard_limit, harvester.harvest(raw_url)).await {
        Ok(result) => shape_result(raw_url, result),
        Err(_) => {
            tracing::error!(
                "Harvest of {} exceeded the hard limit of {:?}",
                raw_url,
                hard_limit
            );
            Err(internal_error())
        }
    }
}

/// Maps a finished harvest onto the response contract
fn shape_result(
    raw_url: &str,
    result: Result<HarvestReport, HarvestError>,
) -> Result<AnalyzeResponse, (StatusCode, ErrorResponse)> {
    match result {
        Ok(report) => Ok(AnalyzeResponse::from(report)),
        Err(HarvestError::UrlError(e)) => {
            Err((StatusCode::BAD_REQUEST, ErrorResponse::new(e.to_string())))
        }
        Err(e) => {
            tracing::error!("Harvest of {} failed: {}", raw_url, e);
            Err(internal_error())
        }
    }
}

fn internal_error() -> (StatusCode, ErrorResponse) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::new(GENERIC_FAILURE),
    )
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn analyze_handler(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Rejected analyze body: {}", rejection);
            AnalyzeRequest { url: None }
        }
    };

    analyze(&state.harvester, request.url.as_deref(), state.hard_limit)
        .await
        .map(Json)
        .map_err(|(status, body)| (status, Json(body)))
}
