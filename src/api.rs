use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::catalog::LocatedStation;
use crate::config::ThresholdDefaults;
use crate::error::ReportError;
use crate::export::ReportTable;
use crate::importers::SourceTable;
use crate::ingest::{ingest_tables, IngestOutcome};
use crate::observation::RawRow;
use crate::services::{ReportBundle, ReportConfig, ReportService};
use crate::window::WindowSelector;

#[derive(Clone)]
pub struct AppState {
    pub report_service: ReportService,
    pub defaults: ThresholdDefaults,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct StationsResponse {
    pub total_stations: usize,
    pub stations: Vec<LocatedStation>,
}

/// Report parameters as sent by clients; omitted thresholds fall back to the service defaults
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequestConfig {
    pub year: i32,
    pub month: u32,
    pub window: WindowSelector,
    #[serde(default)]
    pub wet_threshold: Option<f64>,
    #[serde(default)]
    pub heavy_threshold: Option<f64>,
    #[serde(default)]
    pub rainy_threshold: Option<f64>,
}

impl ReportRequestConfig {
    pub fn resolve(&self, defaults: &ThresholdDefaults) -> ReportConfig {
        ReportConfig {
            year: self.year,
            month: self.month,
            window: self.window,
            wet_threshold: self.wet_threshold.unwrap_or(defaults.wet_mm),
            heavy_threshold: self.heavy_threshold.unwrap_or(defaults.heavy_mm),
            rainy_threshold: self.rainy_threshold.unwrap_or(defaults.rainy_mm),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcePayload {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    pub config: ReportRequestConfig,
    pub sources: Vec<SourcePayload>,
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub warnings: Vec<String>,
    pub dropped_rows: usize,
    pub report: ReportBundle,
}

/// Error returned by report handlers, rendered as `{"error": ...}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl From<ReportError> for ApiError {
    fn from(e: ReportError) -> Self {
        let status = if e.is_invariant_violation() {
            error!("Report invariant violated: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            warn!("Report rejected: {}", e);
            StatusCode::UNPROCESSABLE_ENTITY
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/stations", get(get_stations))
        .route("/reports", post(create_report))
        .route("/reports/{table}", post(create_report_table))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}

#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[instrument(skip(state))]
async fn get_stations(State(state): State<AppState>) -> Json<StationsResponse> {
    let stations = state.report_service.catalog().located_stations();
    info!("Listing {} canonical stations", stations.len());
    Json(StationsResponse {
        total_stations: stations.len(),
        stations,
    })
}

/// Ingest the posted rows and build the report off the async runtime
async fn run_report(
    state: &AppState,
    request: ReportRequest,
) -> Result<(IngestOutcome, ReportBundle), ApiError> {
    let service = state.report_service.clone();
    let config = request.config.resolve(&state.defaults);
    let tables: Vec<SourceTable> = request
        .sources
        .into_iter()
        .map(|source| SourceTable {
            name: source.name,
            rows: source.rows,
        })
        .collect();

    tokio::task::spawn_blocking(move || {
        let outcome = ingest_tables(tables)?;
        let bundle = service.build_report(&outcome.observations, &config)?;
        Ok::<_, ReportError>((outcome, bundle))
    })
    .await
    .map_err(|e| {
        error!("Report task failed: {}", e);
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Report task failed".to_string(),
        }
    })?
    .map_err(ApiError::from)
}

#[instrument(skip(state, request), fields(sources = request.sources.len()))]
async fn create_report(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    let (outcome, report) = run_report(&state, request).await?;

    info!(
        "Built report for {} from {} rows ({} dropped)",
        report.window, outcome.rows_read, outcome.dropped_rows
    );

    Ok(Json(ReportResponse {
        warnings: outcome.warnings,
        dropped_rows: outcome.dropped_rows,
        report,
    }))
}

/// Same pipeline as `create_report`, answered with a single table as CSV
#[instrument(skip(state, request), fields(table = %table))]
async fn create_report_table(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(request): Json<ReportRequest>,
) -> Result<Response, ApiError> {
    let file_name = if table.ends_with(".csv") {
        table.clone()
    } else {
        format!("{table}.csv")
    };
    let report_table = ReportTable::from_file_name(&file_name).map_err(|e| {
        warn!("{}", e);
        ApiError {
            status: StatusCode::NOT_FOUND,
            message: e.to_string(),
        }
    })?;

    let (_, report) = run_report(&state, request).await?;
    let body = report_table.to_csv_string(&report).map_err(|e| {
        error!("Failed to render {}: {}", file_name, e);
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: e.to_string(),
        }
    })?;

    info!("Rendered {} for {}", file_name, report.window);
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body).into_response())
}
