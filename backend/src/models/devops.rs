//! Azure DevOps REST payloads, limited to the fields the dashboard reads.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Envelope used by list endpoints: `{ "count": n, "value": [...] }`.
#[derive(Debug, Deserialize)]
pub struct ValueList<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Iteration {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub attributes: IterationAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationAttributes {
    pub start_date: Option<String>,
    pub finish_date: Option<String>,
    pub time_frame: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: i64,
    pub name: Option<String>,
    pub status: Option<String>,
    pub created_on: Option<String>,
    pub description: Option<String>,
    pub release_definition: ReleaseDefinitionRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseDefinitionRef {
    pub id: i64,
    pub name: Option<String>,
}

/// Result of running a stored WIQL query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WiqlResult {
    #[serde(default)]
    pub work_items: Vec<WorkItemReference>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkItemReference {
    pub id: i64,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationWorkItems {
    #[serde(default)]
    pub work_item_relations: Vec<WorkItemLink>,
}

/// A parent/child link inside an iteration. Top-level items have no source.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkItemLink {
    pub source: Option<WorkItemId>,
    pub target: Option<WorkItemId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkItemId {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkItem {
    pub id: i64,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(rename = "_links", default)]
    pub links: Option<WorkItemLinks>,
}

impl WorkItem {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemLinks {
    pub html: Option<Href>,
    pub work_item_updates: Option<Href>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Href {
    pub href: String,
}
