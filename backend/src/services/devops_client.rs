//! Azure DevOps REST client.
//!
//! The `DevOpsApi` trait is the seam handlers talk to, so routes can be
//! exercised against a fake without network access. `AzureDevOpsClient` is
//! the real implementation: HTTP Basic auth with an empty user name and the
//! personal access token as the password.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::devops::{
    Iteration, IterationWorkItems, Release, ValueList, WiqlResult, WorkItem, WorkItemLink,
    WorkItemReference,
};
use crate::models::project::ProjectContext;

/// Azure DevOps rejects batch work item reads above this many ids.
pub const MAX_WORK_ITEMS_PER_BATCH: usize = 200;

/// Upper bound on releases returned per query.
pub const RELEASES_PAGE_SIZE: u32 = 200;

const RELEASES_API_VERSION: &str = "7.1";

/// Inclusive creation-time window for release queries.
#[derive(Debug, Clone)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Operations the dashboard needs from Azure DevOps.
#[async_trait]
pub trait DevOpsApi: Send + Sync {
    /// All iterations configured for the project's team.
    async fn list_iterations(&self, ctx: &ProjectContext) -> Result<Vec<Iteration>>;

    /// Classic releases under the project's release folder created in `range`.
    async fn list_releases(&self, ctx: &ProjectContext, range: &DateRange) -> Result<Vec<Release>>;

    /// Run the stored release plan query.
    async fn query_release_plan(&self, ctx: &ProjectContext) -> Result<Vec<WorkItemReference>>;

    /// Fetch one work item by its API URL.
    async fn get_work_item(&self, url: &str) -> Result<WorkItem>;

    /// Parent/child links of the work items planned into an iteration.
    async fn list_iteration_work_items(
        &self,
        ctx: &ProjectContext,
        iteration_id: &str,
    ) -> Result<Vec<WorkItemLink>>;

    /// Batch read of work items by id.
    async fn get_work_items(&self, ctx: &ProjectContext, ids: &[i64]) -> Result<Vec<WorkItem>>;
}

pub struct AzureDevOpsClient {
    client: reqwest::Client,
    pat: String,
}

impl AzureDevOpsClient {
    pub fn new(pat: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("release-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            pat: pat.into(),
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .basic_auth("", Some(&self.pat))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Send a request and decode the JSON body. Any failure is reported to
    /// the caller as `failure`; the cause goes to the log.
    async fn fetch<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        failure: &str,
    ) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, "{}", failure);
            AppError::upstream(failure, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let url = response.url().clone();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                url = %url,
                "Azure DevOps request failed"
            );
            return Err(AppError::upstream(
                failure,
                format!("{} from {}: {}", status, url, body),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::error!(error = %e, "Unexpected Azure DevOps response body");
            AppError::upstream(failure, e)
        })
    }
}

#[async_trait]
impl DevOpsApi for AzureDevOpsClient {
    async fn list_iterations(&self, ctx: &ProjectContext) -> Result<Vec<Iteration>> {
        let url = ctx.urls.iterations_url(&ctx.project.team_name);
        let list: ValueList<Iteration> = self
            .fetch(self.get(&url), "Failed to fetch iterations")
            .await?;
        Ok(list.value)
    }

    async fn list_releases(&self, ctx: &ProjectContext, range: &DateRange) -> Result<Vec<Release>> {
        let folder = format!("\\{}", ctx.project.path.trim_start_matches('\\'));
        let top = RELEASES_PAGE_SIZE.to_string();
        let request = self.get(ctx.urls.releases_url()).query(&[
            ("minCreatedTime", range.start.as_str()),
            ("maxCreatedTime", range.end.as_str()),
            ("$top", top.as_str()),
            ("$path", folder.as_str()),
            ("api-version", RELEASES_API_VERSION),
        ]);
        let list: ValueList<Release> = self
            .fetch(request, "Failed to fetch release data")
            .await?;
        Ok(list.value)
    }

    async fn query_release_plan(&self, ctx: &ProjectContext) -> Result<Vec<WorkItemReference>> {
        let result: WiqlResult = self
            .fetch(
                self.get(ctx.urls.release_plan_query_url()),
                "Failed to fetch release plan work items",
            )
            .await?;
        Ok(result.work_items)
    }

    async fn get_work_item(&self, url: &str) -> Result<WorkItem> {
        self.fetch(self.get(url), "Failed to fetch work item details")
            .await
    }

    async fn list_iteration_work_items(
        &self,
        ctx: &ProjectContext,
        iteration_id: &str,
    ) -> Result<Vec<WorkItemLink>> {
        let url = ctx
            .urls
            .iteration_work_items_url(&ctx.project.team_name, iteration_id);
        let result: IterationWorkItems = self
            .fetch(self.get(&url), "Failed to fetch iteration work items")
            .await?;
        Ok(result.work_item_relations)
    }

    async fn get_work_items(&self, ctx: &ProjectContext, ids: &[i64]) -> Result<Vec<WorkItem>> {
        let mut items = Vec::with_capacity(ids.len());
        for batch in ids.chunks(MAX_WORK_ITEMS_PER_BATCH) {
            let url = ctx.urls.work_items_url(batch);
            let list: ValueList<WorkItem> = self
                .fetch(self.get(&url), "Failed to fetch work items")
                .await?;
            items.extend(list.value);
        }
        Ok(items)
    }
}
