//! Iteration ("release") listing handler.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};

use crate::api::handlers::resolve_project;
use crate::api::SharedState;
use crate::error::Result;
use crate::models::dashboard::ReleaseSummary;
use crate::services::dashboard;

#[derive(OpenApi)]
#[openapi(paths(get_releases), components(schemas(ReleaseSummary)))]
pub struct ReleasesApiDoc;

pub fn router() -> Router<SharedState> {
    Router::new().route("/releases", get(get_releases))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReleasesQuery {
    /// Project name; the configured default project when omitted
    pub project: Option<String>,
}

/// GET /api/releases
#[utoipa::path(
    get,
    path = "/releases",
    context_path = "/api",
    tag = "releases",
    operation_id = "get_releases",
    description = "Fetches release data for current and past iterations",
    params(ReleasesQuery),
    responses(
        (status = 200, description = "List of releases with their details", body = Vec<ReleaseSummary>),
        (status = 404, description = "Unknown project", body = crate::api::openapi::ErrorResponse),
        (status = 502, description = "Azure DevOps request failed", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn get_releases(
    State(state): State<SharedState>,
    Query(query): Query<ReleasesQuery>,
) -> Result<Json<Vec<ReleaseSummary>>> {
    let ctx = resolve_project(&state, query.project.as_deref()).await?;
    let iterations = state.devops.list_iterations(&ctx).await?;
    Ok(Json(dashboard::summarize_iterations(iterations)))
}
