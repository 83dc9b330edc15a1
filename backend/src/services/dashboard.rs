//! Reshapes Azure DevOps payloads into dashboard rows.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::config::Config;
use crate::models::dashboard::{IterationWorkItem, PipelineRun, ReleasePlanItem, ReleaseSummary};
use crate::models::devops::{Iteration, Release, WorkItem, WorkItemLink};

/// Shown when a release has no description.
pub const EMPTY_DESCRIPTION: &str = "—";

static HREF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"href="(.*?)""#).expect("valid regex"));

/// Keep iterations that are running or finished, in upstream order.
pub fn summarize_iterations(iterations: Vec<Iteration>) -> Vec<ReleaseSummary> {
    iterations
        .into_iter()
        .filter(|it| {
            matches!(
                it.attributes.time_frame.as_deref(),
                Some("current") | Some("past")
            )
        })
        .map(|it| ReleaseSummary {
            id: it.id,
            name: it.name,
            start_date: it.attributes.start_date,
            finish_date: it.attributes.finish_date,
        })
        .collect()
}

pub fn pipeline_run(config: &Config, release: Release) -> PipelineRun {
    let base = format!(
        "{}/{}",
        config.organization_base(),
        config.devops_project_segment()
    );
    let definition_id = release.release_definition.id;
    PipelineRun {
        release_id: release.id,
        definition_id,
        name: release.name.or(release.release_definition.name),
        status: release.status,
        created_on: release.created_on,
        description: release
            .description
            .unwrap_or_else(|| EMPTY_DESCRIPTION.to_string()),
        pipeline_url: format!(
            "{}/_release?_a=releases&view=mine&definitionId={}",
            base, definition_id
        ),
        release_url: format!(
            "{}/_releaseProgress?_a=release-pipeline-progress&releaseId={}",
            base, release.id
        ),
    }
}

/// First `href="..."` target in the release notes HTML, if any.
pub fn release_notes_link(html: &str) -> Option<String> {
    HREF_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn release_plan_item(item: &WorkItem) -> ReleasePlanItem {
    let links = item.links.clone().unwrap_or_default();
    ReleasePlanItem {
        id: item.id,
        title: item.field_str("System.Title").map(str::to_string),
        state: item.field_str("System.State").map(str::to_string),
        web_url: links.html.map(|h| h.href),
        github_prs: links.work_item_updates.map(|h| h.href),
        release_notes_html: item
            .field_str("Custom.ReleaseNotes")
            .and_then(release_notes_link),
        pm_approval_to_production: item.field("Custom.PMApprovaltoProduction").cloned(),
        dev_approval_to_staging: item.field("Custom.DevApprovaltoStaging").cloned(),
        se_approval_to_production: item.field("Custom.SEApprovaltoProduction").cloned(),
        approval_to_staging: item.field("Custom.ApprovaltoStaging").cloned(),
    }
}

/// Every work item id mentioned by an iteration's links, first-seen order.
pub fn linked_work_item_ids(links: &[WorkItemLink]) -> Vec<i64> {
    let mut ids = Vec::new();
    for link in links {
        for id in [&link.source, &link.target].into_iter().flatten() {
            if !ids.contains(&id.id) {
                ids.push(id.id);
            }
        }
    }
    ids
}

/// Identity fields come back either as an identity object or a plain string.
fn display_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("displayName")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

pub fn iteration_work_item(item: &WorkItem) -> IterationWorkItem {
    IterationWorkItem {
        id: item.id,
        title: item.field_str("System.Title").map(str::to_string),
        state: item.field_str("System.State").map(str::to_string),
        assigned_to: item.field("System.AssignedTo").and_then(display_name),
        area_path: item.field_str("System.AreaPath").map(str::to_string),
        iteration_path: item.field_str("System.IterationPath").map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;

    fn config() -> Config {
        Config::try_parse_from(["release-dashboard", "--azure-pat", "pat"]).unwrap()
    }

    fn iteration(id: &str, time_frame: Option<&str>) -> Iteration {
        serde_json::from_value(json!({
            "id": id,
            "name": format!("Sprint {}", id),
            "attributes": {
                "startDate": "2024-01-01T00:00:00Z",
                "finishDate": "2024-01-14T00:00:00Z",
                "timeFrame": time_frame,
            }
        }))
        .unwrap()
    }

    fn work_item(value: serde_json::Value) -> WorkItem {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_future_iterations_are_dropped() {
        let rows = summarize_iterations(vec![
            iteration("1", Some("past")),
            iteration("2", Some("current")),
            iteration("3", Some("future")),
            iteration("4", None),
        ]);
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(rows[0].start_date.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_pipeline_run_links_and_fallbacks() {
        let release: Release = serde_json::from_value(json!({
            "id": 1,
            "releaseDefinition": {"id": 10, "name": "Pipe", "path": "/"},
            "status": "active",
            "createdOn": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        let run = pipeline_run(&config(), release);
        assert_eq!(run.name.as_deref(), Some("Pipe"));
        assert_eq!(run.description, EMPTY_DESCRIPTION);
        assert_eq!(
            run.pipeline_url,
            "https://dev.azure.com/PSJH/Administrative%20Technology/_release?_a=releases&view=mine&definitionId=10"
        );
        assert_eq!(
            run.release_url,
            "https://dev.azure.com/PSJH/Administrative%20Technology/_releaseProgress?_a=release-pipeline-progress&releaseId=1"
        );
    }

    #[test]
    fn test_pipeline_run_prefers_release_name() {
        let release: Release = serde_json::from_value(json!({
            "id": 5,
            "name": "Release-5",
            "description": "hotfix",
            "releaseDefinition": {"id": 10, "name": "Pipe"}
        }))
        .unwrap();
        let run = pipeline_run(&config(), release);
        assert_eq!(run.name.as_deref(), Some("Release-5"));
        assert_eq!(run.description, "hotfix");
    }

    #[test]
    fn test_release_notes_link() {
        let html = r#"<div>See <a href="https://github.com/org/repo/releases/v1">notes</a> and <a href="https://other">x</a></div>"#;
        assert_eq!(
            release_notes_link(html).as_deref(),
            Some("https://github.com/org/repo/releases/v1")
        );
        assert!(release_notes_link("<div>plain text</div>").is_none());
        assert!(release_notes_link("").is_none());
    }

    #[test]
    fn test_release_plan_item_mapping() {
        let item = work_item(json!({
            "id": 42,
            "fields": {
                "System.Title": "Ship it",
                "System.State": "Approved",
                "Custom.ReleaseNotes": "<a href=\"https://notes\">n</a>",
                "Custom.PMApprovaltoProduction": true,
                "Custom.ApprovaltoStaging": "Yes"
            },
            "_links": {
                "html": {"href": "https://web/42"},
                "workItemUpdates": {"href": "https://api/42/updates"}
            }
        }));
        let row = release_plan_item(&item);
        assert_eq!(row.title.as_deref(), Some("Ship it"));
        assert_eq!(row.web_url.as_deref(), Some("https://web/42"));
        assert_eq!(row.github_prs.as_deref(), Some("https://api/42/updates"));
        assert_eq!(row.release_notes_html.as_deref(), Some("https://notes"));
        assert_eq!(row.pm_approval_to_production, Some(json!(true)));
        assert_eq!(row.approval_to_staging, Some(json!("Yes")));
        assert!(row.dev_approval_to_staging.is_none());

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["PM Approval to Production"], json!(true));
        assert_eq!(value["githubPRs"], json!("https://api/42/updates"));
        assert!(value["Dev Approval to Staging"].is_null());
    }

    #[test]
    fn test_release_plan_item_without_links() {
        let row = release_plan_item(&work_item(json!({"id": 1, "fields": {}})));
        assert!(row.web_url.is_none());
        assert!(row.release_notes_html.is_none());
    }

    #[test]
    fn test_linked_ids_dedup_in_order() {
        let links: Vec<WorkItemLink> = serde_json::from_value(json!([
            {"source": null, "target": {"id": 3}},
            {"source": {"id": 3}, "target": {"id": 1}},
            {"source": {"id": 3}, "target": {"id": 2}},
            {"source": {"id": 1}, "target": {"id": 2}}
        ]))
        .unwrap();
        assert_eq!(linked_work_item_ids(&links), vec![3, 1, 2]);
        assert!(linked_work_item_ids(&[]).is_empty());
    }

    #[test]
    fn test_assigned_to_object_or_string() {
        let a = iteration_work_item(&work_item(json!({
            "id": 1,
            "fields": {
                "System.AreaPath": "A",
                "System.IterationPath": "I",
                "System.AssignedTo": {"displayName": "User", "uniqueName": "user@example.com"},
                "System.Title": "T",
                "System.State": "Active"
            }
        })));
        assert_eq!(a.assigned_to.as_deref(), Some("User"));
        assert_eq!(a.area_path.as_deref(), Some("A"));

        let b = iteration_work_item(&work_item(json!({
            "id": 2,
            "fields": {"System.AssignedTo": "User2"}
        })));
        assert_eq!(b.assigned_to.as_deref(), Some("User2"));

        let c = iteration_work_item(&work_item(json!({"id": 3, "fields": {}})));
        assert!(c.assigned_to.is_none());
    }
}
