use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use jobscout_core::rank::DEFAULT_LIMIT;

use crate::dto::{HealthResponse, JobResponse, SearchQuery, SearchRequest, SearchResponse};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Build the full router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/search", post(search))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/v1/search",
    request_body = SearchRequest,
    params(SearchQuery),
    responses(
        (status = 200, description = "Ranked relevant jobs", body = SearchResponse),
        (status = 400, description = "Invalid criteria", body = crate::dto::ErrorResponse),
        (status = 502, description = "All job sources failed", body = crate::dto::ErrorResponse),
    ),
    tag = "search"
)]
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
    axum::Json(body): axum::Json<SearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let criteria = body.into_criteria();
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    tracing::info!(
        position = %criteria.position,
        location = %criteria.location,
        limit,
        "Search request"
    );

    let results = state.backend.search(criteria, limit).await?;

    let response = SearchResponse {
        relevant_jobs: results.into_iter().map(JobResponse::from).collect(),
    };
    Ok(axum::Json(response))
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service health", body = HealthResponse)),
    tag = "system"
)]
pub async fn health() -> impl IntoResponse {
    axum::Json(HealthResponse {
        status: "healthy".to_string(),
    })
}
