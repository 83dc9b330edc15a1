//! Work item handlers: the release plan and per-iteration work items.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};

use crate::api::handlers::resolve_project;
use crate::api::validation::require;
use crate::api::SharedState;
use crate::error::Result;
use crate::models::dashboard::{IterationWorkItem, ReleasePlanItem};
use crate::services::dashboard;

#[derive(OpenApi)]
#[openapi(
    paths(get_release_plan_work_items, get_iteration_work_items),
    components(schemas(ReleasePlanItem, IterationWorkItem))
)]
pub struct WorkItemsApiDoc;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/release-plan-work-items", get(get_release_plan_work_items))
        .route("/iteration-work-items", get(get_iteration_work_items))
}

/// Work item detail requests kept in flight at once.
const DETAIL_FETCH_CONCURRENCY: usize = 8;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReleasePlanQuery {
    /// Project name; the configured default project when omitted
    pub project: Option<String>,
}

/// GET /api/release-plan-work-items
#[utoipa::path(
    get,
    path = "/release-plan-work-items",
    context_path = "/api",
    tag = "work-items",
    operation_id = "get_release_plan_work_items",
    description = "Fetches work items from the release plan",
    params(ReleasePlanQuery),
    responses(
        (status = 200, description = "Data from the release plan work items", body = Vec<ReleasePlanItem>),
        (status = 404, description = "Unknown project", body = crate::api::openapi::ErrorResponse),
        (status = 502, description = "Azure DevOps request failed", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn get_release_plan_work_items(
    State(state): State<SharedState>,
    Query(query): Query<ReleasePlanQuery>,
) -> Result<Json<Vec<ReleasePlanItem>>> {
    let ctx = resolve_project(&state, query.project.as_deref()).await?;
    let references = state.devops.query_release_plan(&ctx).await?;

    // Items whose details cannot be fetched are left out rather than failing
    // the whole plan.
    let rows: Vec<Option<ReleasePlanItem>> = stream::iter(references)
        .map(|reference| {
            let devops = state.devops.clone();
            async move {
                match devops.get_work_item(&reference.url).await {
                    Ok(item) => Some(dashboard::release_plan_item(&item)),
                    Err(e) => {
                        tracing::warn!(
                            work_item_id = reference.id,
                            error = %e,
                            "Skipping release plan work item"
                        );
                        None
                    }
                }
            }
        })
        .buffered(DETAIL_FETCH_CONCURRENCY)
        .collect()
        .await;

    Ok(Json(rows.into_iter().flatten().collect()))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IterationWorkItemsQuery {
    /// Iteration identifier (GUID)
    pub iteration_id: Option<String>,
    /// Project name; the configured default project when omitted
    pub project: Option<String>,
}

/// GET /api/iteration-work-items
#[utoipa::path(
    get,
    path = "/iteration-work-items",
    context_path = "/api",
    tag = "work-items",
    operation_id = "get_iteration_work_items",
    description = "Fetches the work items planned into an iteration",
    params(IterationWorkItemsQuery),
    responses(
        (status = 200, description = "Work items in the iteration", body = Vec<IterationWorkItem>),
        (status = 400, description = "Missing iteration id", body = crate::api::openapi::ErrorResponse),
        (status = 404, description = "Unknown project", body = crate::api::openapi::ErrorResponse),
        (status = 502, description = "Azure DevOps request failed", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn get_iteration_work_items(
    State(state): State<SharedState>,
    Query(query): Query<IterationWorkItemsQuery>,
) -> Result<Json<Vec<IterationWorkItem>>> {
    let iteration_id = require(query.iteration_id.as_deref(), "Missing iteration_id")?;
    let ctx = resolve_project(&state, query.project.as_deref()).await?;

    let links = state
        .devops
        .list_iteration_work_items(&ctx, iteration_id)
        .await?;
    let ids = dashboard::linked_work_item_ids(&links);
    if ids.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let items = state.devops.get_work_items(&ctx, &ids).await?;
    Ok(Json(items.iter().map(dashboard::iteration_work_item).collect()))
}
