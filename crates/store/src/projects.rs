//! Project manifest lifecycle.
//!
//! Each project directory carries a `manifest.json` describing ingestion
//! progress and per-page titles. The rasterization/OCR pipeline that fills
//! the stage counters is an external collaborator; this module only creates,
//! reads, and patches the manifest document.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use planograph_core::error::CoreError;
use planograph_core::types::Timestamp;

use crate::fs::{atomic_write_json, read_json_opt};

/// Progress counters for one ingestion stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageProgress {
    pub done: u32,
    pub total: u32,
}

/// Ingestion stages tracked per project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestStages {
    pub render: StageProgress,
    pub ocr: StageProgress,
}

/// Project manifest document.
///
/// `status` is reported by the ingestion pipeline and passed through
/// verbatim (`queued`, `rendering`, `ocr`, `complete`, `error`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: String,
    #[serde(default)]
    pub num_pages: Option<u32>,
    #[serde(default)]
    pub stages: ManifestStages,
    pub started_at: Timestamp,
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub page_titles: BTreeMap<String, String>,
}

/// Manages project manifests under a base directory.
pub struct ProjectStore {
    base_dir: PathBuf,
}

impl ProjectStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn manifest_path(&self, project_id: &str) -> PathBuf {
        self.base_dir.join(project_id).join("manifest.json")
    }

    /// Initialize a new project with a default manifest.
    pub async fn create(&self, name: Option<String>) -> Result<ProjectManifest, CoreError> {
        let manifest = ProjectManifest {
            project_id: uuid::Uuid::new_v4().simple().to_string(),
            name,
            status: "queued".to_string(),
            num_pages: None,
            stages: ManifestStages::default(),
            started_at: chrono::Utc::now(),
            completed_at: None,
            error: None,
            page_titles: BTreeMap::new(),
        };
        atomic_write_json(&self.manifest_path(&manifest.project_id), &manifest).await?;
        tracing::info!(project_id = %manifest.project_id, "Project created");
        Ok(manifest)
    }

    /// Load a project manifest, or `None` if the project does not exist.
    pub async fn find(&self, project_id: &str) -> Result<Option<ProjectManifest>, CoreError> {
        read_json_opt(&self.manifest_path(project_id)).await
    }

    /// True if the project has a manifest on disk.
    pub async fn exists(&self, project_id: &str) -> Result<bool, CoreError> {
        Ok(self.find(project_id).await?.is_some())
    }

    /// Set one page title (0-based page index, stored under its decimal key).
    pub async fn set_page_title(
        &self,
        project_id: &str,
        page_index: u32,
        text: String,
    ) -> Result<ProjectManifest, CoreError> {
        let mut manifest = self
            .find(project_id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                node: "project",
                id: project_id.to_string(),
            })?;
        manifest.page_titles.insert(page_index.to_string(), text);
        atomic_write_json(&self.manifest_path(project_id), &manifest).await?;
        Ok(manifest)
    }
}
