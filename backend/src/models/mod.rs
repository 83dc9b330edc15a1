//! Data models: the project registry on disk, Azure DevOps payloads, and the
//! shapes returned to the dashboard.

pub mod dashboard;
pub mod devops;
pub mod project;
