//! Conceptual (non-visual) graph nodes.
//!
//! Concepts have no spatial anchoring; they exist only through their
//! relationships to visual entities. Currently the only kind is `space`.

use serde::{Deserialize, Serialize};

use crate::entity::NodeKind;
use crate::error::CoreError;
use crate::patch::Patch;
use crate::types::{NodeId, Timestamp};

/// Physical or conceptual space (room, area, zone).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
    pub id: NodeId,
    pub name: String,
    pub created_at: Timestamp,
}

/// A conceptual node, discriminated by its `kind` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Concept {
    Space(Space),
}

impl Concept {
    /// Server-assigned id.
    pub fn id(&self) -> &str {
        match self {
            Self::Space(c) => &c.id,
        }
    }

    /// The concept's kind in the shared node-kind namespace.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Space(_) => NodeKind::Space,
        }
    }

    /// Validate the structural invariants of this concept.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Space(space) => {
                if space.name.is_empty() {
                    return Err(CoreError::Validation(
                        "space: name must not be empty".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Creation payload for a concept.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreateConcept {
    Space { name: String },
}

/// Partial update for a concept. Only present fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConceptPatch {
    #[serde(default)]
    pub name: Patch<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn kind_tag_round_trips() {
        let concept = Concept::Space(Space {
            id: "c1".into(),
            name: "Room 101".into(),
            created_at: Utc::now(),
        });
        let json = serde_json::to_value(&concept).unwrap();
        assert_eq!(json["kind"], "space");
        let back: Concept = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), NodeKind::Space);
    }

    #[test]
    fn empty_name_rejected() {
        let concept = Concept::Space(Space {
            id: "c1".into(),
            name: String::new(),
            created_at: Utc::now(),
        });
        assert!(concept.validate().is_err());
    }

    #[test]
    fn create_payload_parses() {
        let payload: CreateConcept =
            serde_json::from_value(serde_json::json!({"kind": "space", "name": "Lobby"})).unwrap();
        let CreateConcept::Space { name } = payload;
        assert_eq!(name, "Lobby");
    }
}
