//! Shared in-memory repository for mutation workflow tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use planograph_core::concept::Concept;
use planograph_core::entity::Entity;
use planograph_core::error::CoreError;
use planograph_core::link::Relationship;
use planograph_core::mutation::{CreateEntity, EntityPatch};
use planograph_core::repository::{ConceptRepository, EntityRepository, LinkRepository};

/// In-memory whole-set store, one document per project per node family.
#[derive(Default)]
pub struct MemoryStore {
    entities: Mutex<HashMap<String, Vec<Entity>>>,
    links: Mutex<HashMap<String, Vec<Relationship>>>,
    concepts: Mutex<HashMap<String, Vec<Concept>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityRepository for MemoryStore {
    async fn load_entities(&self, project_id: &str) -> Result<Vec<Entity>, CoreError> {
        Ok(self
            .entities
            .lock()
            .unwrap()
            .get(project_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_entities(&self, project_id: &str, entities: &[Entity]) -> Result<(), CoreError> {
        self.entities
            .lock()
            .unwrap()
            .insert(project_id.to_string(), entities.to_vec());
        Ok(())
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn load_links(&self, project_id: &str) -> Result<Vec<Relationship>, CoreError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .get(project_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_links(&self, project_id: &str, links: &[Relationship]) -> Result<(), CoreError> {
        self.links
            .lock()
            .unwrap()
            .insert(project_id.to_string(), links.to_vec());
        Ok(())
    }
}

#[async_trait]
impl ConceptRepository for MemoryStore {
    async fn load_concepts(&self, project_id: &str) -> Result<Vec<Concept>, CoreError> {
        Ok(self
            .concepts
            .lock()
            .unwrap()
            .get(project_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_concepts(&self, project_id: &str, concepts: &[Concept]) -> Result<(), CoreError> {
        self.concepts
            .lock()
            .unwrap()
            .insert(project_id.to_string(), concepts.to_vec());
        Ok(())
    }
}

/// Parse a wire-format creation payload.
pub fn create_payload(value: serde_json::Value) -> CreateEntity {
    serde_json::from_value(value).expect("valid creation payload")
}

/// Parse a wire-format patch payload.
pub fn patch_payload(value: serde_json::Value) -> EntityPatch {
    serde_json::from_value(value).expect("valid patch payload")
}
