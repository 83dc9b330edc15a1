//! Business services.

pub mod dashboard;
pub mod devops_client;
pub mod project_store;
