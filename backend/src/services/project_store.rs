//! File-backed registry of dashboard projects.
//!
//! Layout under the data directory:
//!
//! ```text
//! data/
//! ├── projects.json          [{"projectName", "path", "teamName"}, ...]
//! └── <projectName>/
//!     └── urls.json          endpoint templates + pipelines/releases lists
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::project::{ProjectContext, ProjectEntry, ProjectUrls};

const PROJECTS_FILE: &str = "projects.json";
const URLS_FILE: &str = "urls.json";

/// Outcome of registering a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    AlreadyRegistered,
}

pub struct ProjectStore {
    data_dir: PathBuf,
    /// Serializes writes to projects.json and every urls.json.
    write_lock: Mutex<()>,
}

impl ProjectStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn projects_path(&self) -> PathBuf {
        self.data_dir.join(PROJECTS_FILE)
    }

    fn urls_path(&self, project_name: &str) -> PathBuf {
        self.data_dir.join(project_name).join(URLS_FILE)
    }

    /// All registered projects; an absent projects.json means none.
    pub async fn list(&self) -> Result<Vec<ProjectEntry>> {
        match tokio::fs::read(self.projects_path()).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find(&self, project_name: &str) -> Result<Option<ProjectEntry>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|p| p.project_name == project_name))
    }

    pub async fn load_urls(&self, project_name: &str) -> Result<ProjectUrls> {
        match tokio::fs::read(self.urls_path(project_name)).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(
                format!("No endpoint configuration for project '{}'", project_name),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a project and its endpoint templates.
    pub async fn context(&self, project_name: &str) -> Result<ProjectContext> {
        let project = self
            .find(project_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project '{}' not found", project_name)))?;
        let urls = self.load_urls(project_name).await?;
        Ok(ProjectContext { project, urls })
    }

    /// Create the project directory and (re)write its urls.json.
    pub async fn write_urls(&self, project_name: &str, urls: &ProjectUrls) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let dir = self.data_dir.join(project_name);
        tokio::fs::create_dir_all(&dir).await?;
        write_json_atomic(&dir.join(URLS_FILE), urls).await
    }

    /// Append `entry` to projects.json unless a project with the same name
    /// is already registered.
    pub async fn register(&self, entry: ProjectEntry) -> Result<Registration> {
        let _guard = self.write_lock.lock().await;

        let mut projects = self.list().await?;
        if projects
            .iter()
            .any(|p| p.project_name == entry.project_name)
        {
            return Ok(Registration::AlreadyRegistered);
        }

        tokio::fs::create_dir_all(&self.data_dir).await?;
        tracing::info!(project = %entry.project_name, "Registering project");
        projects.push(entry);
        write_json_atomic(&self.projects_path(), &projects).await?;
        Ok(Registration::Added)
    }
}

/// Write pretty JSON to a uniquely named temp file in the target's
/// directory, then rename it over the target.
async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| AppError::Internal(format!("Invalid file path {}", path.display())))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| AppError::Internal(format!("File write task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn entry(name: &str) -> ProjectEntry {
        ProjectEntry {
            project_name: name.to_string(),
            path: name.to_string(),
            team_name: format!("{} Team", name),
        }
    }

    fn urls() -> ProjectUrls {
        ProjectUrls {
            all_releases: "https://vsrm.example/_apis/release/releases".to_string(),
            iterations_list: "https://dev.example/{teamName}/iterations".to_string(),
            wiql_url: "https://dev.example/wiql".to_string(),
            iteration_work_items: "https://dev.example/{teamName}/{iterationId}".to_string(),
            work_items: "https://dev.example/workitems?{workItemIds}".to_string(),
            pipelines: vec!["p1".to_string()],
            releases: vec!["r1".to_string()],
        }
    }

    #[tokio::test]
    async fn test_list_without_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path());
        assert!(store.list().await.unwrap().is_empty());
        assert!(store.find("CHMP").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_appends_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path());

        assert_eq!(store.register(entry("A")).await.unwrap(), Registration::Added);
        assert_eq!(store.register(entry("B")).await.unwrap(), Registration::Added);
        assert_eq!(
            store.register(entry("A")).await.unwrap(),
            Registration::AlreadyRegistered
        );

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.project_name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_projects_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path());
        store.register(entry("CHMP")).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("projects.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["projectName"], "CHMP");
        assert_eq!(value[0]["teamName"], "CHMP Team");
        assert!(raw.contains('\n'), "projects.json should be pretty-printed");
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "only projects.json should remain");
    }

    #[tokio::test]
    async fn test_concurrent_registrations_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ProjectStore::new(dir.path()));

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.register(entry(&format!("P{}", i))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(store.list().await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_urls_roundtrip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path());

        store.write_urls("CHMP", &urls()).await.unwrap();
        assert_eq!(store.load_urls("CHMP").await.unwrap(), urls());

        let mut changed = urls();
        changed.pipelines = vec!["p2".to_string()];
        store.write_urls("CHMP", &changed).await.unwrap();
        assert_eq!(store.load_urls("CHMP").await.unwrap().pipelines, vec!["p2"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_url_writes_for_one_project() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(ProjectStore::new(dir.path()));

        for _ in 0..5 {
            let mut handles = Vec::new();
            for i in 0..16 {
                let store = store.clone();
                handles.push(tokio::spawn(async move {
                    let mut urls = urls();
                    urls.pipelines = vec![format!("p{}", i)];
                    store.write_urls("CHMP", &urls).await
                }));
            }
            for handle in handles {
                handle.await.unwrap().unwrap();
            }
            // Whole file from one of the writers, never a mix.
            let loaded = store.load_urls("CHMP").await.unwrap();
            assert_eq!(loaded.pipelines.len(), 1);
        }

        let entries: Vec<_> = std::fs::read_dir(dir.path().join("CHMP"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("urls.json")]);
    }

    #[tokio::test]
    async fn test_context_requires_entry_and_urls() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path());

        assert!(matches!(
            store.context("CHMP").await,
            Err(AppError::NotFound(_))
        ));

        store.register(entry("CHMP")).await.unwrap();
        assert!(matches!(
            store.context("CHMP").await,
            Err(AppError::NotFound(_))
        ));

        store.write_urls("CHMP", &urls()).await.unwrap();
        let ctx = store.context("CHMP").await.unwrap();
        assert_eq!(ctx.project.team_name, "CHMP Team");
        assert_eq!(ctx.urls.releases, vec!["r1"]);
    }

    #[tokio::test]
    async fn test_corrupt_projects_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("projects.json"), "{not json").unwrap();
        let store = ProjectStore::new(dir.path());
        assert!(matches!(store.list().await, Err(AppError::Json(_))));
    }
}
