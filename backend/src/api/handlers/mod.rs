//! HTTP request handlers.

pub mod health;
pub mod pipelines;
pub mod projects;
pub mod releases;
pub mod work_items;

use axum::Router;

use crate::api::validation::validate_project_name;
use crate::api::{AppState, SharedState};
use crate::error::Result;
use crate::models::project::ProjectContext;

/// Routes mounted under `/api`.
pub fn api_router() -> Router<SharedState> {
    Router::new()
        .merge(projects::router())
        .merge(releases::router())
        .merge(pipelines::router())
        .merge(work_items::router())
}

/// Resolve the project a request targets, falling back to the configured
/// default when the caller names none.
pub(crate) async fn resolve_project(
    state: &AppState,
    requested: Option<&str>,
) -> Result<ProjectContext> {
    let name = requested
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(state.config.default_project.as_str());
    validate_project_name(name, "Project name")?;
    state.projects.context(name).await
}
