//! OpenAPI specification generated from handler annotations via utoipa.

use utoipa::OpenApi;

/// Top-level OpenAPI document for the Release Dashboard API.
///
/// Each handler module contributes its own paths and schemas via per-module
/// `#[derive(OpenApi)]` structs that are merged into this root document at
/// startup.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Release Dashboard API",
        description = "Release, pipeline and work item views over Azure DevOps.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    tags(
        (name = "projects", description = "Dashboard project registry"),
        (name = "releases", description = "Current and past iterations"),
        (name = "pipelines", description = "Classic release pipelines in a date range"),
        (name = "work-items", description = "Release plan and iteration work items"),
        (name = "health", description = "Health checks"),
    ),
    components(schemas(ErrorResponse))
)]
pub struct ApiDoc;

/// Standard error response body returned by all endpoints on failure.
#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g. "NOT_FOUND", "VALIDATION_ERROR")
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

/// Build the merged OpenAPI document from all handler modules.
pub fn build_openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.version = env!("CARGO_PKG_VERSION").to_string();

    doc.merge(super::handlers::projects::ProjectsApiDoc::openapi());
    doc.merge(super::handlers::releases::ReleasesApiDoc::openapi());
    doc.merge(super::handlers::pipelines::PipelinesApiDoc::openapi());
    doc.merge(super::handlers::work_items::WorkItemsApiDoc::openapi());
    doc.merge(super::handlers::health::HealthApiDoc::openapi());

    doc
}
