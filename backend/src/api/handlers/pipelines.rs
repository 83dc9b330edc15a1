//! Release pipeline handler.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};

use crate::api::handlers::resolve_project;
use crate::api::validation::{require, validate_date_range};
use crate::api::SharedState;
use crate::error::Result;
use crate::models::dashboard::PipelineRun;
use crate::services::dashboard;
use crate::services::devops_client::DateRange;

#[derive(OpenApi)]
#[openapi(paths(get_pipeline_data), components(schemas(PipelineRun)))]
pub struct PipelinesApiDoc;

pub fn router() -> Router<SharedState> {
    Router::new().route("/pipelines", get(get_pipeline_data))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct PipelineQuery {
    /// Start date
    pub start_date: Option<String>,
    /// End date
    pub end_date: Option<String>,
    /// Project name; the configured default project when omitted
    pub project: Option<String>,
}

const MISSING_DATES: &str = "Missing start or end date";

/// GET /api/pipelines
#[utoipa::path(
    get,
    path = "/pipelines",
    context_path = "/api",
    tag = "pipelines",
    operation_id = "get_pipeline_data",
    description = "Fetches pipeline data for releases within a specified date range",
    params(PipelineQuery),
    responses(
        (status = 200, description = "List of pipelines with their details", body = Vec<PipelineRun>),
        (status = 400, description = "Missing or inverted date range", body = crate::api::openapi::ErrorResponse),
        (status = 404, description = "Unknown project", body = crate::api::openapi::ErrorResponse),
        (status = 502, description = "Azure DevOps request failed", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn get_pipeline_data(
    State(state): State<SharedState>,
    Query(query): Query<PipelineQuery>,
) -> Result<Json<Vec<PipelineRun>>> {
    let start = require(query.start_date.as_deref(), MISSING_DATES)?;
    let end = require(query.end_date.as_deref(), MISSING_DATES)?;
    validate_date_range(start, end)?;

    let ctx = resolve_project(&state, query.project.as_deref()).await?;
    let range = DateRange {
        start: start.to_string(),
        end: end.to_string(),
    };
    let releases = state.devops.list_releases(&ctx, &range).await?;
    tracing::debug!(
        project = %ctx.project.project_name,
        count = releases.len(),
        "Fetched releases"
    );

    Ok(Json(
        releases
            .into_iter()
            .map(|r| dashboard::pipeline_run(&state.config, r))
            .collect(),
    ))
}
