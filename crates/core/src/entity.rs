//! Entity domain model for visual annotations on construction drawings.
//!
//! Entities form a closed tagged union discriminated by `entity_type`.
//! Drawings and definitions always carry a sheet number and bounding box;
//! page-anchored containers (legends, schedules, assembly groups, notes) may
//! stay ungrounded until a box is attached; scopes and instances may have no
//! spatial placement at all. Bounding boxes are always stored in unrotated
//! document-point space.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geometry::BoundingBox;
use crate::types::{NodeId, Timestamp};

// ---------------------------------------------------------------------------
// Kind namespace
// ---------------------------------------------------------------------------

/// Kind of a graph node, spanning both visual entities and concepts.
///
/// Relationship validation uses this single namespace for both node families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Drawing,
    Legend,
    LegendItem,
    Schedule,
    ScheduleItem,
    AssemblyGroup,
    Assembly,
    Note,
    Scope,
    SymbolDefinition,
    ComponentDefinition,
    SymbolInstance,
    ComponentInstance,
    Space,
}

impl NodeKind {
    /// Return the kind as its wire-format string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drawing => "drawing",
            Self::Legend => "legend",
            Self::LegendItem => "legend_item",
            Self::Schedule => "schedule",
            Self::ScheduleItem => "schedule_item",
            Self::AssemblyGroup => "assembly_group",
            Self::Assembly => "assembly",
            Self::Note => "note",
            Self::Scope => "scope",
            Self::SymbolDefinition => "symbol_definition",
            Self::ComponentDefinition => "component_definition",
            Self::SymbolInstance => "symbol_instance",
            Self::ComponentInstance => "component_instance",
            Self::Space => "space",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Shared metadata types
// ---------------------------------------------------------------------------

/// Review status of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    Incomplete,
    Complete,
}

/// Flags for required data an entity is still missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<bool>,
}

/// Validation marker attached to entities with known gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<MissingValidation>,
}

/// Reuse scope of a symbol or component definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionScope {
    Project,
    #[default]
    Sheet,
}

/// Kind of definition item an instance may resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionItemKind {
    Assembly,
    ScheduleItem,
    LegendItem,
}

impl DefinitionItemKind {
    /// The node kind an item of this type must have.
    pub fn node_kind(self) -> NodeKind {
        match self {
            Self::Assembly => NodeKind::Assembly,
            Self::ScheduleItem => NodeKind::ScheduleItem,
            Self::LegendItem => NodeKind::LegendItem,
        }
    }
}

// ---------------------------------------------------------------------------
// Variant payloads
// ---------------------------------------------------------------------------

/// Drawing viewport on a sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drawing {
    pub id: NodeId,
    pub source_sheet_number: u32,
    pub bounding_box: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationInfo>,
}

/// Container for keynote legend entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Legend {
    pub id: NodeId,
    pub source_sheet_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationInfo>,
}

/// Individual keynote entry within a legend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegendItem {
    pub id: NodeId,
    pub legend_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_sheet_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationInfo>,
}

/// Container for door/window/finish/equipment schedules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: NodeId,
    pub source_sheet_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationInfo>,
}

/// Individual schedule row within a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: NodeId,
    pub schedule_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawing_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_sheet_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationInfo>,
}

/// Container for assembly details and callouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyGroup {
    pub id: NodeId,
    pub source_sheet_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationInfo>,
}

/// Individual assembly detail within an assembly group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assembly {
    pub id: NodeId,
    pub assembly_group_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawing_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_sheet_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationInfo>,
}

/// Text note or annotation block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: NodeId,
    pub source_sheet_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationInfo>,
}

/// Scope of work, either conceptual (no box) or an area annotation on a sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_sheet_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationInfo>,
}

/// Definition of a symbol (visual pattern) in a legend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolDefinition {
    pub id: NodeId,
    pub source_sheet_number: u32,
    pub bounding_box: BoundingBox,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_pattern_description: Option<String>,
    #[serde(default)]
    pub scope: DefinitionScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_in_id: Option<NodeId>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationInfo>,
}

/// Definition of a component in a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub id: NodeId,
    pub source_sheet_number: u32,
    pub bounding_box: BoundingBox,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<serde_json::Value>,
    #[serde(default)]
    pub scope: DefinitionScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_in_id: Option<NodeId>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationInfo>,
}

/// Occurrence of a symbol definition, conceptual or placed on a sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolInstance {
    pub id: NodeId,
    pub symbol_definition_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recognized_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_item_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_item_type: Option<DefinitionItemKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_sheet_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instantiated_in_id: Option<NodeId>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationInfo>,
}

/// Occurrence of a component definition, conceptual or placed on a sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentInstance {
    pub id: NodeId,
    pub component_definition_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_sheet_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instantiated_in_id: Option<NodeId>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationInfo>,
}

// ---------------------------------------------------------------------------
// Entity union
// ---------------------------------------------------------------------------

/// A visual entity, discriminated by its `entity_type` tag.
///
/// Adding a kind here intentionally breaks every `match` over the union
/// until the new kind is handled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "entity_type", rename_all = "snake_case")]
pub enum Entity {
    Drawing(Drawing),
    Legend(Legend),
    LegendItem(LegendItem),
    Schedule(Schedule),
    ScheduleItem(ScheduleItem),
    AssemblyGroup(AssemblyGroup),
    Assembly(Assembly),
    Note(Note),
    Scope(Scope),
    SymbolDefinition(SymbolDefinition),
    ComponentDefinition(ComponentDefinition),
    SymbolInstance(SymbolInstance),
    ComponentInstance(ComponentInstance),
}

impl Entity {
    /// The entity's kind tag.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Drawing(_) => NodeKind::Drawing,
            Self::Legend(_) => NodeKind::Legend,
            Self::LegendItem(_) => NodeKind::LegendItem,
            Self::Schedule(_) => NodeKind::Schedule,
            Self::ScheduleItem(_) => NodeKind::ScheduleItem,
            Self::AssemblyGroup(_) => NodeKind::AssemblyGroup,
            Self::Assembly(_) => NodeKind::Assembly,
            Self::Note(_) => NodeKind::Note,
            Self::Scope(_) => NodeKind::Scope,
            Self::SymbolDefinition(_) => NodeKind::SymbolDefinition,
            Self::ComponentDefinition(_) => NodeKind::ComponentDefinition,
            Self::SymbolInstance(_) => NodeKind::SymbolInstance,
            Self::ComponentInstance(_) => NodeKind::ComponentInstance,
        }
    }

    /// Server-assigned id.
    pub fn id(&self) -> &str {
        match self {
            Self::Drawing(e) => &e.id,
            Self::Legend(e) => &e.id,
            Self::LegendItem(e) => &e.id,
            Self::Schedule(e) => &e.id,
            Self::ScheduleItem(e) => &e.id,
            Self::AssemblyGroup(e) => &e.id,
            Self::Assembly(e) => &e.id,
            Self::Note(e) => &e.id,
            Self::Scope(e) => &e.id,
            Self::SymbolDefinition(e) => &e.id,
            Self::ComponentDefinition(e) => &e.id,
            Self::SymbolInstance(e) => &e.id,
            Self::ComponentInstance(e) => &e.id,
        }
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> Timestamp {
        match self {
            Self::Drawing(e) => e.created_at,
            Self::Legend(e) => e.created_at,
            Self::LegendItem(e) => e.created_at,
            Self::Schedule(e) => e.created_at,
            Self::ScheduleItem(e) => e.created_at,
            Self::AssemblyGroup(e) => e.created_at,
            Self::Assembly(e) => e.created_at,
            Self::Note(e) => e.created_at,
            Self::Scope(e) => e.created_at,
            Self::SymbolDefinition(e) => e.created_at,
            Self::ComponentDefinition(e) => e.created_at,
            Self::SymbolInstance(e) => e.created_at,
            Self::ComponentInstance(e) => e.created_at,
        }
    }

    /// Sheet the entity is anchored to, if any.
    pub fn source_sheet_number(&self) -> Option<u32> {
        match self {
            Self::Drawing(e) => Some(e.source_sheet_number),
            Self::Legend(e) => Some(e.source_sheet_number),
            Self::LegendItem(e) => e.source_sheet_number,
            Self::Schedule(e) => Some(e.source_sheet_number),
            Self::ScheduleItem(e) => e.source_sheet_number,
            Self::AssemblyGroup(e) => Some(e.source_sheet_number),
            Self::Assembly(e) => e.source_sheet_number,
            Self::Note(e) => Some(e.source_sheet_number),
            Self::Scope(e) => e.source_sheet_number,
            Self::SymbolDefinition(e) => Some(e.source_sheet_number),
            Self::ComponentDefinition(e) => Some(e.source_sheet_number),
            Self::SymbolInstance(e) => e.source_sheet_number,
            Self::ComponentInstance(e) => e.source_sheet_number,
        }
    }

    /// The entity's bounding box, if grounded.
    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        match self {
            Self::Drawing(e) => Some(&e.bounding_box),
            Self::Legend(e) => e.bounding_box.as_ref(),
            Self::LegendItem(e) => e.bounding_box.as_ref(),
            Self::Schedule(e) => e.bounding_box.as_ref(),
            Self::ScheduleItem(e) => e.bounding_box.as_ref(),
            Self::AssemblyGroup(e) => e.bounding_box.as_ref(),
            Self::Assembly(e) => e.bounding_box.as_ref(),
            Self::Note(e) => e.bounding_box.as_ref(),
            Self::Scope(e) => e.bounding_box.as_ref(),
            Self::SymbolDefinition(e) => Some(&e.bounding_box),
            Self::ComponentDefinition(e) => Some(&e.bounding_box),
            Self::SymbolInstance(e) => e.bounding_box.as_ref(),
            Self::ComponentInstance(e) => e.bounding_box.as_ref(),
        }
    }

    /// Parent container reference for definition items.
    pub fn parent_container_id(&self) -> Option<&str> {
        match self {
            Self::LegendItem(e) => Some(&e.legend_id),
            Self::ScheduleItem(e) => Some(&e.schedule_id),
            Self::Assembly(e) => Some(&e.assembly_group_id),
            _ => None,
        }
    }

    /// Validate the structural invariants of this entity.
    ///
    /// Applied at construction and again after every patch merge, so a
    /// mutated record can never leave the invariants behind.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(sheet) = self.source_sheet_number() {
            if sheet < 1 {
                return Err(CoreError::Validation(format!(
                    "{}: source_sheet_number must be >= 1",
                    self.kind()
                )));
            }
        }
        if self.bounding_box().is_some() && self.source_sheet_number().is_none() {
            return Err(CoreError::Validation(format!(
                "{}: source_sheet_number required when bounding_box is provided",
                self.kind()
            )));
        }
        match self {
            Self::Scope(scope) => {
                let has_text = scope.name.as_deref().is_some_and(|s| !s.is_empty())
                    || scope.description.as_deref().is_some_and(|s| !s.is_empty());
                if scope.bounding_box.is_none() && !has_text {
                    return Err(CoreError::Validation(
                        "scope: name or description required for conceptual scopes \
                         (scopes without bounding box)"
                            .to_string(),
                    ));
                }
            }
            Self::SymbolDefinition(def) => {
                if def.name.is_empty() {
                    return Err(CoreError::Validation(
                        "symbol_definition: name must not be empty".to_string(),
                    ));
                }
            }
            Self::ComponentDefinition(def) => {
                if def.name.is_empty() {
                    return Err(CoreError::Validation(
                        "component_definition: name must not be empty".to_string(),
                    ));
                }
            }
            Self::SymbolInstance(inst) => {
                match (&inst.definition_item_id, &inst.definition_item_type) {
                    (Some(_), None) => {
                        return Err(CoreError::Validation(
                            "symbol_instance: definition_item_type required when \
                             definition_item_id is provided"
                                .to_string(),
                        ));
                    }
                    (None, Some(_)) => {
                        return Err(CoreError::Validation(
                            "symbol_instance: definition_item_id required when \
                             definition_item_type is provided"
                                .to_string(),
                        ));
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
