use std::path::{Path, PathBuf};

use panelsmith_core::model::Project;
use tokio::sync::Mutex;

use crate::{StoreError, STORE_FILE_NAME};

/// File-backed project list.
///
/// Cheap to share behind an `Arc`. Read-modify-write cycles inside one
/// process are serialized by an internal lock; nothing coordinates with
/// other processes touching the same file.
pub struct ProjectStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ProjectStore {
    /// Open (and create if needed) the store inside `data_dir`.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        tokio::fs::create_dir_all(data_dir).await?;
        let path = data_dir.join(STORE_FILE_NAME);
        tracing::info!(path = %path.display(), "Opened project store");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored projects, in storage order.
    ///
    /// A missing document yields an empty list; a corrupt one is logged and
    /// also yields an empty list.
    pub async fn list(&self) -> Vec<Project> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Error loading projects");
                return Vec::new();
            }
        };
        if raw.trim().is_empty() {
            return Vec::new();
        }
        match serde_json::from_str(&raw) {
            Ok(projects) => projects,
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Stored projects are corrupt");
                Vec::new()
            }
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Option<Project> {
        self.list().await.into_iter().find(|p| p.id == id)
    }

    /// Create and persist a new empty project.
    pub async fn create(&self, name: &str) -> Result<Project, StoreError> {
        self.save(Project::new(name)).await
    }

    /// Insert or replace a project, stamping `updated_at` with the save time.
    ///
    /// The saved project moves to the end of the list. Returns the project
    /// as stored.
    pub async fn save(&self, mut project: Project) -> Result<Project, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut projects = self.list().await;
        projects.retain(|p| p.id != project.id);
        project.updated_at = chrono::Utc::now();
        projects.push(project.clone());
        self.write_all(&projects).await?;
        tracing::debug!(project_id = %project.id, count = projects.len(), "Project saved");
        Ok(project)
    }

    /// Remove a project. Returns `false` if no project had that id.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut projects = self.list().await;
        let before = projects.len();
        projects.retain(|p| p.id != id);
        if projects.len() == before {
            return Ok(false);
        }
        self.write_all(&projects).await?;
        tracing::debug!(project_id = %id, "Project deleted");
        Ok(true)
    }

    /// Replace the document: write a sibling temp file, then rename it over
    /// the original so readers never see a half-written list.
    async fn write_all(&self, projects: &[Project]) -> Result<(), StoreError> {
        let body = serde_json::to_vec(projects)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
