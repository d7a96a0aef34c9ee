//! File-backed repository implementations.
//!
//! Each project keeps one JSON document per node family under its own
//! directory:
//!
//! ```text
//! {base}/{project_id}/entities.json
//! {base}/{project_id}/links.json
//! {base}/{project_id}/concepts.json
//! {base}/{project_id}/pages/page_{n}.json   (render meta, written by ingestion)
//! ```
//!
//! Documents are always loaded and rewritten whole; callers serialize
//! concurrent mutations per project with [`crate::locks::ProjectLocks`].

use std::path::PathBuf;

use async_trait::async_trait;

use planograph_core::concept::Concept;
use planograph_core::coords::RenderMeta;
use planograph_core::entity::Entity;
use planograph_core::error::CoreError;
use planograph_core::link::Relationship;
use planograph_core::repository::{
    ConceptRepository, EntityRepository, LinkRepository, RenderMetaProvider,
};

use crate::fs::{atomic_write_json, read_json_opt, read_json_or_default};

/// Whole-document JSON store rooted at a base directory.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Directory holding one project's documents.
    pub fn project_dir(&self, project_id: &str) -> PathBuf {
        self.base_dir.join(project_id)
    }

    fn entities_path(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join("entities.json")
    }

    fn links_path(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join("links.json")
    }

    fn concepts_path(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join("concepts.json")
    }

    fn page_meta_path(&self, project_id: &str, sheet: u32) -> PathBuf {
        self.project_dir(project_id)
            .join("pages")
            .join(format!("page_{sheet}.json"))
    }
}

#[async_trait]
impl EntityRepository for FileStore {
    async fn load_entities(&self, project_id: &str) -> Result<Vec<Entity>, CoreError> {
        read_json_or_default(&self.entities_path(project_id)).await
    }

    async fn save_entities(&self, project_id: &str, entities: &[Entity]) -> Result<(), CoreError> {
        atomic_write_json(&self.entities_path(project_id), &entities).await
    }
}

#[async_trait]
impl LinkRepository for FileStore {
    async fn load_links(&self, project_id: &str) -> Result<Vec<Relationship>, CoreError> {
        read_json_or_default(&self.links_path(project_id)).await
    }

    async fn save_links(&self, project_id: &str, links: &[Relationship]) -> Result<(), CoreError> {
        atomic_write_json(&self.links_path(project_id), &links).await
    }
}

#[async_trait]
impl ConceptRepository for FileStore {
    async fn load_concepts(&self, project_id: &str) -> Result<Vec<Concept>, CoreError> {
        read_json_or_default(&self.concepts_path(project_id)).await
    }

    async fn save_concepts(&self, project_id: &str, concepts: &[Concept]) -> Result<(), CoreError> {
        atomic_write_json(&self.concepts_path(project_id), &concepts).await
    }
}

#[async_trait]
impl RenderMetaProvider for FileStore {
    async fn render_meta(&self, project_id: &str, sheet: u32) -> Result<RenderMeta, CoreError> {
        let path = self.page_meta_path(project_id, sheet);
        read_json_opt::<RenderMeta>(&path)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                node: "sheet",
                id: sheet.to_string(),
            })
    }
}

/// Seed a page's render metadata. The production writer is the ingestion
/// pipeline; this is used by tests and backfill tooling.
pub async fn write_render_meta(
    store: &FileStore,
    project_id: &str,
    sheet: u32,
    meta: &RenderMeta,
) -> Result<(), CoreError> {
    atomic_write_json(&store.page_meta_path(project_id, sheet), meta).await
}
