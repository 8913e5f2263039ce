//! HTTP route handlers.

use askama::Template;
use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::locator::locate_gate;

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/railway_data", post(railway_data))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Index page with the batch form.
async fn index_page() -> impl IntoResponse {
    Html(
        IndexTemplate
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e)),
    )
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Estimate the status of a batch of gates.
async fn railway_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let request = RailwayDataRequest::from_json(&body).map_err(|e| {
        warn!(error = %e, "rejected railway_data request");
        AppError::BadRequest {
            message: e.to_string(),
        }
    })?;

    let RailwayDataRequest {
        gates,
        route_coordinates,
        selected_gate_id,
    } = request;
    info!(
        gates = gates.len(),
        route_points = route_coordinates.len(),
        "received railway_data request"
    );

    let located = gates
        .into_iter()
        .map(|g| {
            let position = g.position();
            locate_gate(&state.index, g.gate_number, position, &route_coordinates)
        })
        .collect();

    let now = state.config.now();
    let outcomes = state
        .orchestrator
        .process_batch(located, selected_gate_id.as_ref(), now)
        .await;
    let reports: Vec<GateReport> = outcomes.into_iter().map(GateReport::from).collect();

    if accepts_html(&headers) {
        let template = GateResultsTemplate {
            gates: reports.iter().map(GateView::from_report).collect(),
        };
        let html = template.render().map_err(|e| AppError::Internal {
            message: format!("Template error: {}", e),
        })?;

        Ok(Html(html).into_response())
    } else {
        Ok(Json(RailwayDataResponse { gates: reports }).into_response())
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Internal { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Internal { message } => {
                error!(error = %message, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
