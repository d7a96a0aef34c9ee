//! Abstract repository collaborators.
//!
//! The entity/link/concept set of a project is always read and written as a
//! whole per operation; there are no partial persistence operations. Because
//! every mutation is load → mutate → save, concurrent mutations on one
//! project must be serialized by the caller (a per-project lock around the
//! cycle); the implementations in `planograph-store` ship one.
//!
//! Implementations surface their I/O failures as [`CoreError::Storage`];
//! the core passes them through uninterpreted and never retries.

use async_trait::async_trait;

use crate::concept::Concept;
use crate::coords::RenderMeta;
use crate::entity::Entity;
use crate::error::CoreError;
use crate::link::Relationship;

/// Whole-set persistence for a project's visual entities.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    /// Load every entity in the project. A project with no entities yet
    /// yields an empty set.
    async fn load_entities(&self, project_id: &str) -> Result<Vec<Entity>, CoreError>;

    /// Replace the project's entire entity set.
    async fn save_entities(&self, project_id: &str, entities: &[Entity]) -> Result<(), CoreError>;
}

/// Whole-set persistence for a project's relationships.
#[async_trait]
pub trait LinkRepository: Send + Sync {
    async fn load_links(&self, project_id: &str) -> Result<Vec<Relationship>, CoreError>;

    async fn save_links(&self, project_id: &str, links: &[Relationship]) -> Result<(), CoreError>;
}

/// Whole-set persistence for a project's concepts.
#[async_trait]
pub trait ConceptRepository: Send + Sync {
    async fn load_concepts(&self, project_id: &str) -> Result<Vec<Concept>, CoreError>;

    async fn save_concepts(&self, project_id: &str, concepts: &[Concept]) -> Result<(), CoreError>;
}

/// Per-sheet rendering metadata, produced by the external ingestion pipeline.
#[async_trait]
pub trait RenderMetaProvider: Send + Sync {
    /// Render metadata for one sheet (1-based).
    async fn render_meta(&self, project_id: &str, sheet: u32) -> Result<RenderMeta, CoreError>;
}
