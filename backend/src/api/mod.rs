//! HTTP API: shared state, routing and middleware.

pub mod handlers;
pub mod openapi;
pub mod validation;

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::services::devops_client::DevOpsApi;
use crate::services::project_store::ProjectStore;

/// State shared by all handlers.
pub struct AppState {
    pub config: Config,
    pub devops: Arc<dyn DevOpsApi>,
    pub projects: ProjectStore,
}

impl AppState {
    pub fn new(config: Config, devops: Arc<dyn DevOpsApi>) -> Self {
        let projects = ProjectStore::new(config.data_dir.clone());
        Self {
            config,
            devops,
            projects,
        }
    }
}

pub type SharedState = Arc<AppState>;

/// Build the application router.
///
/// CORS mirrors the caller's origin and allows credentials, so any dashboard
/// host can call the API from a browser.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .nest("/api", handlers::api_router())
        .merge(handlers::health::router())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::build_openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::very_permissive()),
        )
        .with_state(state)
}
