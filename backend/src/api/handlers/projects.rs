//! Project registry handlers.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};

use crate::api::validation::{require, validate_project_name};
use crate::api::SharedState;
use crate::error::Result;
use crate::models::dashboard::CreateProjectResponse;
use crate::models::project::{ProjectContext, ProjectCreateRequest, ProjectEntry, ProjectUrls};
use crate::services::project_store::Registration;

#[derive(OpenApi)]
#[openapi(
    paths(list_projects, create_project, get_project_info),
    components(schemas(
        ProjectEntry,
        ProjectUrls,
        ProjectContext,
        ProjectCreateRequest,
        CreateProjectResponse
    ))
)]
pub struct ProjectsApiDoc;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/projects", get(list_projects))
        .route("/create-project", post(create_project))
        .route("/project-info", get(get_project_info))
}

/// GET /api/projects
#[utoipa::path(
    get,
    path = "/projects",
    context_path = "/api",
    tag = "projects",
    operation_id = "list_projects",
    description = "Lists the names of registered projects",
    responses(
        (status = 200, description = "Project names", body = Vec<String>),
    ),
)]
pub async fn list_projects(State(state): State<SharedState>) -> Result<Json<Vec<String>>> {
    let projects = state.projects.list().await?;
    Ok(Json(projects.into_iter().map(|p| p.project_name).collect()))
}

/// POST /api/create-project
#[utoipa::path(
    post,
    path = "/create-project",
    context_path = "/api",
    tag = "projects",
    operation_id = "create_project",
    description = "Registers a project and writes its endpoint configuration",
    request_body = ProjectCreateRequest,
    responses(
        (status = 200, description = "Project registered", body = CreateProjectResponse),
        (status = 400, description = "Invalid project", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn create_project(
    State(state): State<SharedState>,
    Json(payload): Json<ProjectCreateRequest>,
) -> Result<Json<CreateProjectResponse>> {
    validate_project_name(&payload.project_name, "Project name")?;
    let team_name = require(Some(payload.team_name.as_str()), "Team name is required")?;
    let path = match payload.path.trim() {
        "" => payload.project_name.as_str(),
        p => p,
    };

    let mut urls = ProjectUrls::defaults(&state.config);
    urls.pipelines = payload.pipelines.clone();
    urls.releases = payload.releases.clone();
    state
        .projects
        .write_urls(&payload.project_name, &urls)
        .await?;

    let entry = ProjectEntry {
        project_name: payload.project_name.clone(),
        path: path.to_string(),
        team_name: team_name.to_string(),
    };
    let (created, project) = match state.projects.register(entry.clone()).await? {
        Registration::Added => (true, entry),
        Registration::AlreadyRegistered => {
            let existing = state.projects.find(&payload.project_name).await?;
            (false, existing.unwrap_or(entry))
        }
    };

    tracing::info!(
        project = %project.project_name,
        created = created,
        "Project configuration saved"
    );

    Ok(Json(CreateProjectResponse {
        success: true,
        created,
        project,
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectInfoQuery {
    /// Registered project name
    pub project_name: Option<String>,
}

/// GET /api/project-info
#[utoipa::path(
    get,
    path = "/project-info",
    context_path = "/api",
    tag = "projects",
    operation_id = "get_project_info",
    description = "Returns a project's registry entry and endpoint configuration",
    params(ProjectInfoQuery),
    responses(
        (status = 200, description = "Project and its URLs", body = ProjectContext),
        (status = 400, description = "Missing or invalid project name", body = crate::api::openapi::ErrorResponse),
        (status = 404, description = "Unknown project", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn get_project_info(
    State(state): State<SharedState>,
    Query(query): Query<ProjectInfoQuery>,
) -> Result<Json<ProjectContext>> {
    let name = require(query.project_name.as_deref(), "Missing project_name")?;
    validate_project_name(name, "Project name")?;
    Ok(Json(state.projects.context(name).await?))
}
