//! Project registry records stored under the data directory.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::Config;

/// One entry of `projects.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProjectEntry {
    #[serde(rename = "projectName")]
    pub project_name: String,
    /// Release folder path, used as the `$path` filter on release queries.
    pub path: String,
    /// Azure DevOps team that owns the project's iterations.
    #[serde(rename = "teamName")]
    pub team_name: String,
}

/// Endpoint templates stored in `<data_dir>/<project>/urls.json`.
///
/// Templates use `{teamName}`, `{iterationId}` and `{workItemIds}`
/// placeholders that are filled in per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProjectUrls {
    #[serde(rename = "all-releases")]
    pub all_releases: String,
    #[serde(rename = "iterations-list")]
    pub iterations_list: String,
    #[serde(rename = "wiql-url")]
    pub wiql_url: String,
    #[serde(rename = "iteration-work-items")]
    pub iteration_work_items: String,
    #[serde(rename = "work-items")]
    pub work_items: String,
    #[serde(default)]
    pub pipelines: Vec<String>,
    #[serde(default)]
    pub releases: Vec<String>,
}

impl ProjectUrls {
    /// Default endpoint set for a new project.
    pub fn defaults(config: &Config) -> Self {
        let org = config.organization_base();
        let vsrm = config.release_management_base();
        let project = config.devops_project_segment();
        Self {
            all_releases: format!("{}/{}/_apis/release/releases", vsrm, project),
            iterations_list: format!(
                "{}/{}/{{teamName}}/_apis/work/teamsettings/iterations?&api-version=7.1",
                org, project
            ),
            wiql_url: config.release_plan_query_url.clone(),
            iteration_work_items: format!(
                "{}/{}/{{teamName}}/_apis/work/teamsettings/iterations/{{iterationId}}/workitems?api-version=7.2-preview.1",
                org, project
            ),
            work_items: format!(
                "{}/{}/_apis/wit/workitems?{{workItemIds}}&api-version=7.2-preview.3",
                org, project
            ),
            pipelines: Vec::new(),
            releases: Vec::new(),
        }
    }

    pub fn iterations_url(&self, team_name: &str) -> String {
        self.iterations_list
            .trim()
            .replace("{teamName}", &urlencoding::encode(team_name))
    }

    pub fn iteration_work_items_url(&self, team_name: &str, iteration_id: &str) -> String {
        self.iteration_work_items
            .trim()
            .replace("{teamName}", &urlencoding::encode(team_name))
            .replace("{iterationId}", &urlencoding::encode(iteration_id))
    }

    pub fn work_items_url(&self, ids: &[i64]) -> String {
        let ids = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.work_items
            .trim()
            .replace("{workItemIds}", &format!("ids={}", ids))
    }

    pub fn releases_url(&self) -> &str {
        self.all_releases.trim()
    }

    pub fn release_plan_query_url(&self) -> &str {
        self.wiql_url.trim()
    }
}

/// A registered project together with its endpoint templates.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProjectContext {
    pub project: ProjectEntry,
    pub urls: ProjectUrls,
}

/// Body of `POST /api/create-project`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProjectCreateRequest {
    pub project_name: String,
    #[serde(default)]
    pub pipelines: Vec<String>,
    #[serde(default)]
    pub releases: Vec<String>,
    #[serde(rename = "teamName")]
    pub team_name: String,
    pub path: String,
}
