//! Release dashboard backend.
//!
//! An HTTP API that reads iterations, classic releases and work items from
//! Azure DevOps and reshapes them for the release dashboard front end.
//! Dashboard projects and their endpoint templates live as JSON files under
//! the data directory.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
