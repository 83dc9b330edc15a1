//! Response payloads consumed by the dashboard front end.
//!
//! Field names are part of the front end contract and are spelled exactly as
//! it expects, including the approval columns with spaces in them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::project::ProjectEntry;

/// A current or past iteration, shown as a release on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSummary {
    pub id: String,
    pub name: String,
    pub start_date: Option<String>,
    pub finish_date: Option<String>,
}

/// A classic release created inside the requested date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRun {
    pub release_id: i64,
    pub definition_id: i64,
    pub name: Option<String>,
    pub status: Option<String>,
    pub created_on: Option<String>,
    pub description: String,
    pub pipeline_url: String,
    pub release_url: String,
}

/// A work item from the release plan query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReleasePlanItem {
    pub id: i64,
    pub title: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "webUrl")]
    pub web_url: Option<String>,
    #[serde(rename = "githubPRs")]
    pub github_prs: Option<String>,
    /// First link found in the release notes HTML field.
    pub release_notes_html: Option<String>,
    #[serde(rename = "PM Approval to Production")]
    #[schema(value_type = Option<Object>)]
    pub pm_approval_to_production: Option<Value>,
    #[serde(rename = "Dev Approval to Staging")]
    #[schema(value_type = Option<Object>)]
    pub dev_approval_to_staging: Option<Value>,
    #[serde(rename = "SE Approval to Production")]
    #[schema(value_type = Option<Object>)]
    pub se_approval_to_production: Option<Value>,
    #[serde(rename = "Approval to Staging")]
    #[schema(value_type = Option<Object>)]
    pub approval_to_staging: Option<Value>,
}

/// A work item planned into an iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IterationWorkItem {
    pub id: i64,
    pub title: Option<String>,
    pub state: Option<String>,
    pub assigned_to: Option<String>,
    pub area_path: Option<String>,
    pub iteration_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateProjectResponse {
    pub success: bool,
    /// False when the project was already registered; its urls.json is
    /// rewritten either way.
    pub created: bool,
    pub project: ProjectEntry,
}
