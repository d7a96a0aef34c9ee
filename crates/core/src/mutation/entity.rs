//! Entity create / update / delete workflows.
//!
//! The unified mutation path for both UI and AI-driven editing: payload
//! validation, referential checks, spatial auto-linking, and whole-set
//! persistence all live here so every caller gets identical behavior.

use serde::Deserialize;

use crate::entity::{
    Assembly, AssemblyGroup, ComponentDefinition, ComponentInstance, DefinitionItemKind,
    DefinitionScope, Drawing, Entity, EntityStatus, Legend, LegendItem, MissingValidation,
    NodeKind, Note, Schedule, ScheduleItem, Scope, SymbolDefinition, SymbolInstance,
    ValidationInfo,
};
use crate::error::CoreError;
use crate::geometry::BoundingBox;
use crate::linking::{find_containing_drawing, find_intersecting_parent};
use crate::mutation::{ensure_kind, find_entity, linking_candidates};
use crate::patch::Patch;
use crate::repository::{EntityRepository, LinkRepository};
use crate::types::{new_node_id, NodeId};

// ---------------------------------------------------------------------------
// Creation payloads
// ---------------------------------------------------------------------------

/// Entity creation payload, discriminated by `entity_type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "entity_type", rename_all = "snake_case")]
pub enum CreateEntity {
    Drawing {
        source_sheet_number: u32,
        bounding_box: Vec<f64>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        status: Option<EntityStatus>,
        #[serde(default)]
        validation: Option<ValidationInfo>,
    },
    Legend {
        source_sheet_number: u32,
        #[serde(default)]
        bounding_box: Option<Vec<f64>>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        notes: Option<String>,
        #[serde(default)]
        status: Option<EntityStatus>,
        #[serde(default)]
        validation: Option<ValidationInfo>,
    },
    LegendItem {
        legend_id: NodeId,
        #[serde(default)]
        symbol_text: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        notes: Option<String>,
        #[serde(default)]
        source_sheet_number: Option<u32>,
        #[serde(default)]
        bounding_box: Option<Vec<f64>>,
        #[serde(default)]
        status: Option<EntityStatus>,
        #[serde(default)]
        validation: Option<ValidationInfo>,
    },
    Schedule {
        source_sheet_number: u32,
        #[serde(default)]
        bounding_box: Option<Vec<f64>>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        schedule_type: Option<String>,
        #[serde(default)]
        notes: Option<String>,
        #[serde(default)]
        status: Option<EntityStatus>,
        #[serde(default)]
        validation: Option<ValidationInfo>,
    },
    ScheduleItem {
        schedule_id: NodeId,
        #[serde(default)]
        mark: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        notes: Option<String>,
        #[serde(default)]
        specifications: Option<serde_json::Value>,
        #[serde(default)]
        drawing_id: Option<NodeId>,
        #[serde(default)]
        source_sheet_number: Option<u32>,
        #[serde(default)]
        bounding_box: Option<Vec<f64>>,
        #[serde(default)]
        status: Option<EntityStatus>,
        #[serde(default)]
        validation: Option<ValidationInfo>,
    },
    AssemblyGroup {
        source_sheet_number: u32,
        #[serde(default)]
        bounding_box: Option<Vec<f64>>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        notes: Option<String>,
        #[serde(default)]
        status: Option<EntityStatus>,
        #[serde(default)]
        validation: Option<ValidationInfo>,
    },
    Assembly {
        assembly_group_id: NodeId,
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        notes: Option<String>,
        #[serde(default)]
        specifications: Option<serde_json::Value>,
        #[serde(default)]
        drawing_id: Option<NodeId>,
        #[serde(default)]
        source_sheet_number: Option<u32>,
        #[serde(default)]
        bounding_box: Option<Vec<f64>>,
        #[serde(default)]
        status: Option<EntityStatus>,
        #[serde(default)]
        validation: Option<ValidationInfo>,
    },
    Note {
        source_sheet_number: u32,
        #[serde(default)]
        bounding_box: Option<Vec<f64>>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        status: Option<EntityStatus>,
        #[serde(default)]
        validation: Option<ValidationInfo>,
    },
    Scope {
        #[serde(default)]
        source_sheet_number: Option<u32>,
        #[serde(default)]
        bounding_box: Option<Vec<f64>>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        status: Option<EntityStatus>,
        #[serde(default)]
        validation: Option<ValidationInfo>,
    },
    SymbolDefinition {
        source_sheet_number: u32,
        bounding_box: Vec<f64>,
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        visual_pattern_description: Option<String>,
        #[serde(default)]
        scope: DefinitionScope,
        #[serde(default)]
        defined_in_id: Option<NodeId>,
        #[serde(default)]
        status: Option<EntityStatus>,
        #[serde(default)]
        validation: Option<ValidationInfo>,
    },
    ComponentDefinition {
        source_sheet_number: u32,
        bounding_box: Vec<f64>,
        name: String,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        specifications: Option<serde_json::Value>,
        #[serde(default)]
        scope: DefinitionScope,
        #[serde(default)]
        defined_in_id: Option<NodeId>,
        #[serde(default)]
        status: Option<EntityStatus>,
        #[serde(default)]
        validation: Option<ValidationInfo>,
    },
    SymbolInstance {
        symbol_definition_id: NodeId,
        #[serde(default)]
        recognized_text: Option<String>,
        #[serde(default)]
        definition_item_id: Option<NodeId>,
        #[serde(default)]
        definition_item_type: Option<DefinitionItemKind>,
        #[serde(default)]
        source_sheet_number: Option<u32>,
        #[serde(default)]
        bounding_box: Option<Vec<f64>>,
        #[serde(default)]
        status: Option<EntityStatus>,
        #[serde(default)]
        validation: Option<ValidationInfo>,
    },
    ComponentInstance {
        component_definition_id: NodeId,
        #[serde(default)]
        source_sheet_number: Option<u32>,
        #[serde(default)]
        bounding_box: Option<Vec<f64>>,
        #[serde(default)]
        status: Option<EntityStatus>,
        #[serde(default)]
        validation: Option<ValidationInfo>,
    },
}

// ---------------------------------------------------------------------------
// Update payload
// ---------------------------------------------------------------------------

/// Partial entity update. Only keys present in the wire payload are applied;
/// a present `null` clears the field. Fields that do not apply to the target
/// entity's kind are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntityPatch {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub notes: Patch<String>,
    #[serde(default)]
    pub text: Patch<String>,
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub status: Patch<EntityStatus>,
    #[serde(default)]
    pub validation: Patch<ValidationInfo>,
    #[serde(default)]
    pub bounding_box: Patch<Vec<f64>>,
    #[serde(default)]
    pub source_sheet_number: Patch<u32>,
    #[serde(default)]
    pub symbol_text: Patch<String>,
    #[serde(default)]
    pub mark: Patch<String>,
    #[serde(default)]
    pub code: Patch<String>,
    #[serde(default)]
    pub schedule_type: Patch<String>,
    #[serde(default)]
    pub recognized_text: Patch<String>,
    #[serde(default)]
    pub visual_pattern_description: Patch<String>,
    #[serde(default)]
    pub specifications: Patch<serde_json::Value>,
    #[serde(default)]
    pub scope: Patch<DefinitionScope>,
    #[serde(default)]
    pub defined_in_id: Patch<NodeId>,
    #[serde(default)]
    pub instantiated_in_id: Patch<NodeId>,
    #[serde(default)]
    pub definition_item_id: Patch<NodeId>,
    #[serde(default)]
    pub definition_item_type: Patch<DefinitionItemKind>,
    #[serde(default)]
    pub legend_id: Patch<NodeId>,
    #[serde(default)]
    pub schedule_id: Patch<NodeId>,
    #[serde(default)]
    pub assembly_group_id: Patch<NodeId>,
    #[serde(default)]
    pub drawing_id: Patch<NodeId>,
    #[serde(default)]
    pub symbol_definition_id: Patch<NodeId>,
    #[serde(default)]
    pub component_definition_id: Patch<NodeId>,
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Create a new entity, auto-linking it spatially where applicable.
pub async fn create_entity(
    repo: &dyn EntityRepository,
    project_id: &str,
    payload: CreateEntity,
) -> Result<Entity, CoreError> {
    let mut entities = repo.load_entities(project_id).await?;
    let entity = build_entity(payload, &entities)?;
    entity.validate()?;
    entities.push(entity.clone());
    repo.save_entities(project_id, &entities).await?;
    Ok(entity)
}

fn build_entity(payload: CreateEntity, entities: &[Entity]) -> Result<Entity, CoreError> {
    let id = new_node_id();
    let created_at = chrono::Utc::now();

    match payload {
        CreateEntity::Drawing {
            source_sheet_number,
            bounding_box,
            title,
            description,
            status,
            validation,
        } => Ok(Entity::Drawing(Drawing {
            id,
            source_sheet_number,
            bounding_box: BoundingBox::from_coords(&bounding_box)?,
            title,
            description,
            created_at,
            status,
            validation,
        })),

        CreateEntity::Legend {
            source_sheet_number,
            bounding_box,
            title,
            notes,
            status,
            validation,
        } => {
            let bounding_box = optional_bbox(bounding_box)?;
            let (status, validation) = grounding_marker(status, validation, bounding_box.is_some());
            Ok(Entity::Legend(Legend {
                id,
                source_sheet_number,
                bounding_box,
                title,
                notes,
                created_at,
                status,
                validation,
            }))
        }

        CreateEntity::LegendItem {
            legend_id,
            symbol_text,
            description,
            notes,
            source_sheet_number,
            bounding_box,
            status,
            validation,
        } => {
            ensure_kind(entities, &legend_id, NodeKind::Legend)?;
            Ok(Entity::LegendItem(LegendItem {
                id,
                legend_id,
                symbol_text,
                description,
                notes,
                source_sheet_number,
                bounding_box: optional_bbox(bounding_box)?,
                created_at,
                status,
                validation,
            }))
        }

        CreateEntity::Schedule {
            source_sheet_number,
            bounding_box,
            title,
            schedule_type,
            notes,
            status,
            validation,
        } => {
            let bounding_box = optional_bbox(bounding_box)?;
            let (status, validation) = grounding_marker(status, validation, bounding_box.is_some());
            Ok(Entity::Schedule(Schedule {
                id,
                source_sheet_number,
                bounding_box,
                title,
                schedule_type,
                notes,
                created_at,
                status,
                validation,
            }))
        }

        CreateEntity::ScheduleItem {
            schedule_id,
            mark,
            description,
            notes,
            specifications,
            drawing_id,
            source_sheet_number,
            bounding_box,
            status,
            validation,
        } => {
            ensure_kind(entities, &schedule_id, NodeKind::Schedule)?;
            if let Some(drawing_id) = &drawing_id {
                ensure_kind(entities, drawing_id, NodeKind::Drawing)?;
            }
            Ok(Entity::ScheduleItem(ScheduleItem {
                id,
                schedule_id,
                mark,
                description,
                notes,
                specifications,
                drawing_id,
                source_sheet_number,
                bounding_box: optional_bbox(bounding_box)?,
                created_at,
                status,
                validation,
            }))
        }

        CreateEntity::AssemblyGroup {
            source_sheet_number,
            bounding_box,
            title,
            notes,
            status,
            validation,
        } => {
            let bounding_box = optional_bbox(bounding_box)?;
            let (status, validation) = grounding_marker(status, validation, bounding_box.is_some());
            Ok(Entity::AssemblyGroup(AssemblyGroup {
                id,
                source_sheet_number,
                bounding_box,
                title,
                notes,
                created_at,
                status,
                validation,
            }))
        }

        CreateEntity::Assembly {
            assembly_group_id,
            code,
            name,
            description,
            notes,
            specifications,
            drawing_id,
            source_sheet_number,
            bounding_box,
            status,
            validation,
        } => {
            ensure_kind(entities, &assembly_group_id, NodeKind::AssemblyGroup)?;
            if let Some(drawing_id) = &drawing_id {
                ensure_kind(entities, drawing_id, NodeKind::Drawing)?;
            }
            Ok(Entity::Assembly(Assembly {
                id,
                assembly_group_id,
                code,
                name,
                description,
                notes,
                specifications,
                drawing_id,
                source_sheet_number,
                bounding_box: optional_bbox(bounding_box)?,
                created_at,
                status,
                validation,
            }))
        }

        CreateEntity::Note {
            source_sheet_number,
            bounding_box,
            text,
            status,
            validation,
        } => {
            let bounding_box = optional_bbox(bounding_box)?;
            let (status, validation) = grounding_marker(status, validation, bounding_box.is_some());
            Ok(Entity::Note(Note {
                id,
                source_sheet_number,
                bounding_box,
                text,
                created_at,
                status,
                validation,
            }))
        }

        CreateEntity::Scope {
            source_sheet_number,
            bounding_box,
            name,
            description,
            status,
            validation,
        } => Ok(Entity::Scope(Scope {
            id,
            name,
            description,
            source_sheet_number,
            bounding_box: optional_bbox(bounding_box)?,
            created_at,
            status,
            validation,
        })),

        CreateEntity::SymbolDefinition {
            source_sheet_number,
            bounding_box,
            name,
            description,
            visual_pattern_description,
            scope,
            defined_in_id,
            status,
            validation,
        } => {
            let bounding_box = BoundingBox::from_coords(&bounding_box)?;
            let defined_in_id = resolve_defined_in(
                defined_in_id,
                &bounding_box,
                source_sheet_number,
                entities,
                NodeKind::Legend,
            );
            Ok(Entity::SymbolDefinition(SymbolDefinition {
                id,
                source_sheet_number,
                bounding_box,
                name,
                description,
                visual_pattern_description,
                scope,
                defined_in_id,
                created_at,
                status,
                validation,
            }))
        }

        CreateEntity::ComponentDefinition {
            source_sheet_number,
            bounding_box,
            name,
            description,
            specifications,
            scope,
            defined_in_id,
            status,
            validation,
        } => {
            let bounding_box = BoundingBox::from_coords(&bounding_box)?;
            let defined_in_id = resolve_defined_in(
                defined_in_id,
                &bounding_box,
                source_sheet_number,
                entities,
                NodeKind::Schedule,
            );
            Ok(Entity::ComponentDefinition(ComponentDefinition {
                id,
                source_sheet_number,
                bounding_box,
                name,
                description,
                specifications,
                scope,
                defined_in_id,
                created_at,
                status,
                validation,
            }))
        }

        CreateEntity::SymbolInstance {
            symbol_definition_id,
            recognized_text,
            definition_item_id,
            definition_item_type,
            source_sheet_number,
            bounding_box,
            status,
            validation,
        } => {
            let definition =
                ensure_kind(entities, &symbol_definition_id, NodeKind::SymbolDefinition)?;
            validate_definition_scope(definition, source_sheet_number)?;
            if let (Some(item_id), Some(item_type)) = (&definition_item_id, &definition_item_type) {
                ensure_definition_item(entities, item_id, *item_type)?;
            }
            let bounding_box = optional_bbox(bounding_box)?;
            let instantiated_in_id =
                resolve_instantiated_in(&bounding_box, source_sheet_number, entities);
            Ok(Entity::SymbolInstance(SymbolInstance {
                id,
                symbol_definition_id,
                recognized_text,
                definition_item_id,
                definition_item_type,
                source_sheet_number,
                bounding_box,
                instantiated_in_id,
                created_at,
                status,
                validation,
            }))
        }

        CreateEntity::ComponentInstance {
            component_definition_id,
            source_sheet_number,
            bounding_box,
            status,
            validation,
        } => {
            let definition =
                ensure_kind(entities, &component_definition_id, NodeKind::ComponentDefinition)?;
            validate_definition_scope(definition, source_sheet_number)?;
            let bounding_box = optional_bbox(bounding_box)?;
            let instantiated_in_id =
                resolve_instantiated_in(&bounding_box, source_sheet_number, entities);
            Ok(Entity::ComponentInstance(ComponentInstance {
                id,
                component_definition_id,
                source_sheet_number,
                bounding_box,
                instantiated_in_id,
                created_at,
                status,
                validation,
            }))
        }
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// Apply a partial update to an entity, re-validating the merged record and
/// recomputing auto-links when its spatial placement changed.
pub async fn update_entity(
    repo: &dyn EntityRepository,
    project_id: &str,
    entity_id: &str,
    patch: EntityPatch,
) -> Result<Entity, CoreError> {
    let mut entities = repo.load_entities(project_id).await?;
    let index = entities
        .iter()
        .position(|e| e.id() == entity_id)
        .ok_or_else(|| CoreError::NotFound {
            node: "entity",
            id: entity_id.to_string(),
        })?;

    let mut merged = entities[index].clone();
    apply_patch(&mut merged, &patch, &entities)?;
    merged.validate()?;

    if patch.bounding_box.is_set() || patch.source_sheet_number.is_set() {
        recompute_auto_links(&mut merged, &patch, &entities);
    }

    entities[index] = merged.clone();
    repo.save_entities(project_id, &entities).await?;
    Ok(merged)
}

/// Merge present patch fields into the entity, checking changed references.
/// Fields that do not exist on the entity's kind are ignored.
fn apply_patch(
    entity: &mut Entity,
    patch: &EntityPatch,
    entities: &[Entity],
) -> Result<(), CoreError> {
    match entity {
        Entity::Drawing(e) => {
            e.title = patch.title.clone().resolve(e.title.take());
            e.description = patch.description.clone().resolve(e.description.take());
            e.source_sheet_number =
                required_sheet(e.source_sheet_number, &patch.source_sheet_number, NodeKind::Drawing)?;
            e.bounding_box =
                required_bbox(e.bounding_box, &patch.bounding_box, NodeKind::Drawing)?;
            apply_common(&mut e.status, &mut e.validation, patch);
        }

        Entity::Legend(e) => {
            e.title = patch.title.clone().resolve(e.title.take());
            e.notes = patch.notes.clone().resolve(e.notes.take());
            e.source_sheet_number =
                required_sheet(e.source_sheet_number, &patch.source_sheet_number, NodeKind::Legend)?;
            e.bounding_box = patched_bbox(e.bounding_box.take(), &patch.bounding_box)?;
            apply_common(&mut e.status, &mut e.validation, patch);
            let (status, validation) =
                grounding_marker(e.status, e.validation.take(), e.bounding_box.is_some());
            e.status = status;
            e.validation = validation;
        }

        Entity::LegendItem(e) => {
            e.legend_id =
                required_ref(&e.legend_id, &patch.legend_id, entities, NodeKind::Legend)?;
            e.symbol_text = patch.symbol_text.clone().resolve(e.symbol_text.take());
            e.description = patch.description.clone().resolve(e.description.take());
            e.notes = patch.notes.clone().resolve(e.notes.take());
            e.source_sheet_number = patch
                .source_sheet_number
                .clone()
                .resolve(e.source_sheet_number.take());
            e.bounding_box = patched_bbox(e.bounding_box.take(), &patch.bounding_box)?;
            apply_common(&mut e.status, &mut e.validation, patch);
        }

        Entity::Schedule(e) => {
            e.title = patch.title.clone().resolve(e.title.take());
            e.schedule_type = patch.schedule_type.clone().resolve(e.schedule_type.take());
            e.notes = patch.notes.clone().resolve(e.notes.take());
            e.source_sheet_number = required_sheet(
                e.source_sheet_number,
                &patch.source_sheet_number,
                NodeKind::Schedule,
            )?;
            e.bounding_box = patched_bbox(e.bounding_box.take(), &patch.bounding_box)?;
            apply_common(&mut e.status, &mut e.validation, patch);
            let (status, validation) =
                grounding_marker(e.status, e.validation.take(), e.bounding_box.is_some());
            e.status = status;
            e.validation = validation;
        }

        Entity::ScheduleItem(e) => {
            e.schedule_id =
                required_ref(&e.schedule_id, &patch.schedule_id, entities, NodeKind::Schedule)?;
            e.drawing_id =
                optional_ref(e.drawing_id.take(), &patch.drawing_id, entities, NodeKind::Drawing)?;
            e.mark = patch.mark.clone().resolve(e.mark.take());
            e.description = patch.description.clone().resolve(e.description.take());
            e.notes = patch.notes.clone().resolve(e.notes.take());
            e.specifications = patch.specifications.clone().resolve(e.specifications.take());
            e.source_sheet_number = patch
                .source_sheet_number
                .clone()
                .resolve(e.source_sheet_number.take());
            e.bounding_box = patched_bbox(e.bounding_box.take(), &patch.bounding_box)?;
            apply_common(&mut e.status, &mut e.validation, patch);
        }

        Entity::AssemblyGroup(e) => {
            e.title = patch.title.clone().resolve(e.title.take());
            e.notes = patch.notes.clone().resolve(e.notes.take());
            e.source_sheet_number = required_sheet(
                e.source_sheet_number,
                &patch.source_sheet_number,
                NodeKind::AssemblyGroup,
            )?;
            e.bounding_box = patched_bbox(e.bounding_box.take(), &patch.bounding_box)?;
            apply_common(&mut e.status, &mut e.validation, patch);
            let (status, validation) =
                grounding_marker(e.status, e.validation.take(), e.bounding_box.is_some());
            e.status = status;
            e.validation = validation;
        }

        Entity::Assembly(e) => {
            e.assembly_group_id = required_ref(
                &e.assembly_group_id,
                &patch.assembly_group_id,
                entities,
                NodeKind::AssemblyGroup,
            )?;
            e.drawing_id =
                optional_ref(e.drawing_id.take(), &patch.drawing_id, entities, NodeKind::Drawing)?;
            e.code = patch.code.clone().resolve(e.code.take());
            e.name = patch.name.clone().resolve(e.name.take());
            e.description = patch.description.clone().resolve(e.description.take());
            e.notes = patch.notes.clone().resolve(e.notes.take());
            e.specifications = patch.specifications.clone().resolve(e.specifications.take());
            e.source_sheet_number = patch
                .source_sheet_number
                .clone()
                .resolve(e.source_sheet_number.take());
            e.bounding_box = patched_bbox(e.bounding_box.take(), &patch.bounding_box)?;
            apply_common(&mut e.status, &mut e.validation, patch);
        }

        Entity::Note(e) => {
            e.text = patch.text.clone().resolve(e.text.take());
            e.source_sheet_number =
                required_sheet(e.source_sheet_number, &patch.source_sheet_number, NodeKind::Note)?;
            e.bounding_box = patched_bbox(e.bounding_box.take(), &patch.bounding_box)?;
            apply_common(&mut e.status, &mut e.validation, patch);
            let (status, validation) =
                grounding_marker(e.status, e.validation.take(), e.bounding_box.is_some());
            e.status = status;
            e.validation = validation;
        }

        Entity::Scope(e) => {
            e.name = patch.name.clone().resolve(e.name.take());
            e.description = patch.description.clone().resolve(e.description.take());
            e.source_sheet_number = patch
                .source_sheet_number
                .clone()
                .resolve(e.source_sheet_number.take());
            e.bounding_box = patched_bbox(e.bounding_box.take(), &patch.bounding_box)?;
            apply_common(&mut e.status, &mut e.validation, patch);
        }

        Entity::SymbolDefinition(e) => {
            e.name = required_string(&e.name, &patch.name, "name", NodeKind::SymbolDefinition)?;
            e.description = patch.description.clone().resolve(e.description.take());
            e.visual_pattern_description = patch
                .visual_pattern_description
                .clone()
                .resolve(e.visual_pattern_description.take());
            e.scope = required_scope(e.scope, &patch.scope)?;
            e.defined_in_id = patch.defined_in_id.clone().resolve(e.defined_in_id.take());
            e.source_sheet_number = required_sheet(
                e.source_sheet_number,
                &patch.source_sheet_number,
                NodeKind::SymbolDefinition,
            )?;
            e.bounding_box =
                required_bbox(e.bounding_box, &patch.bounding_box, NodeKind::SymbolDefinition)?;
            apply_common(&mut e.status, &mut e.validation, patch);
        }

        Entity::ComponentDefinition(e) => {
            e.name = required_string(&e.name, &patch.name, "name", NodeKind::ComponentDefinition)?;
            e.description = patch.description.clone().resolve(e.description.take());
            e.specifications = patch.specifications.clone().resolve(e.specifications.take());
            e.scope = required_scope(e.scope, &patch.scope)?;
            e.defined_in_id = patch.defined_in_id.clone().resolve(e.defined_in_id.take());
            e.source_sheet_number = required_sheet(
                e.source_sheet_number,
                &patch.source_sheet_number,
                NodeKind::ComponentDefinition,
            )?;
            e.bounding_box = required_bbox(
                e.bounding_box,
                &patch.bounding_box,
                NodeKind::ComponentDefinition,
            )?;
            apply_common(&mut e.status, &mut e.validation, patch);
        }

        Entity::SymbolInstance(e) => {
            e.symbol_definition_id = required_ref(
                &e.symbol_definition_id,
                &patch.symbol_definition_id,
                entities,
                NodeKind::SymbolDefinition,
            )?;
            e.recognized_text = patch.recognized_text.clone().resolve(e.recognized_text.take());
            if patch.definition_item_id.is_set() || patch.definition_item_type.is_set() {
                let item_id = patch
                    .definition_item_id
                    .clone()
                    .resolve(e.definition_item_id.take());
                let item_type = patch
                    .definition_item_type
                    .clone()
                    .resolve(e.definition_item_type.take());
                match (&item_id, &item_type) {
                    (Some(id), Some(kind)) => ensure_definition_item(entities, id, *kind)?,
                    (None, None) => {}
                    _ => {
                        return Err(CoreError::Validation(
                            "symbol_instance: definition_item_id and definition_item_type \
                             must be provided together or cleared together"
                                .to_string(),
                        ));
                    }
                }
                e.definition_item_id = item_id;
                e.definition_item_type = item_type;
            }
            e.source_sheet_number = patch
                .source_sheet_number
                .clone()
                .resolve(e.source_sheet_number.take());
            e.bounding_box = patched_bbox(e.bounding_box.take(), &patch.bounding_box)?;
            e.instantiated_in_id = patch
                .instantiated_in_id
                .clone()
                .resolve(e.instantiated_in_id.take());
            apply_common(&mut e.status, &mut e.validation, patch);
        }

        Entity::ComponentInstance(e) => {
            e.component_definition_id = required_ref(
                &e.component_definition_id,
                &patch.component_definition_id,
                entities,
                NodeKind::ComponentDefinition,
            )?;
            e.source_sheet_number = patch
                .source_sheet_number
                .clone()
                .resolve(e.source_sheet_number.take());
            e.bounding_box = patched_bbox(e.bounding_box.take(), &patch.bounding_box)?;
            e.instantiated_in_id = patch
                .instantiated_in_id
                .clone()
                .resolve(e.instantiated_in_id.take());
            apply_common(&mut e.status, &mut e.validation, patch);
        }
    }
    Ok(())
}

/// Recompute spatial auto-links after a bounding-box or sheet change.
///
/// Policies differ deliberately: a definition keeps its existing container
/// when nothing intersects (sticky), while an instance outside every drawing
/// is cleared. An explicit value in the patch always wins over the computed
/// result, so a manual override is never silently recomputed away.
fn recompute_auto_links(entity: &mut Entity, patch: &EntityPatch, entities: &[Entity]) {
    match entity {
        Entity::SymbolDefinition(def) => {
            if patch.defined_in_id.is_set() {
                return;
            }
            let candidates = linking_candidates(entities, def.source_sheet_number);
            if let Some(parent) = find_intersecting_parent(
                &def.bounding_box,
                def.source_sheet_number,
                &candidates,
                NodeKind::Legend,
            ) {
                def.defined_in_id = Some(parent.id().to_string());
            }
        }
        Entity::ComponentDefinition(def) => {
            if patch.defined_in_id.is_set() {
                return;
            }
            let candidates = linking_candidates(entities, def.source_sheet_number);
            if let Some(parent) = find_intersecting_parent(
                &def.bounding_box,
                def.source_sheet_number,
                &candidates,
                NodeKind::Schedule,
            ) {
                def.defined_in_id = Some(parent.id().to_string());
            }
        }
        Entity::SymbolInstance(inst) => {
            if patch.instantiated_in_id.is_set() {
                return;
            }
            inst.instantiated_in_id = resolve_instantiated_in(
                &inst.bounding_box,
                inst.source_sheet_number,
                entities,
            );
        }
        Entity::ComponentInstance(inst) => {
            if patch.instantiated_in_id.is_set() {
                return;
            }
            inst.instantiated_in_id = resolve_instantiated_in(
                &inst.bounding_box,
                inst.source_sheet_number,
                entities,
            );
        }
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// Delete an entity, cascading its relationships.
///
/// Returns `Ok(false)` if the entity does not exist. Refuses with a
/// [`CoreError::Conflict`] when the target is still referenced: a definition
/// with instances, a container with child items, or a definition item bound
/// to an instance.
pub async fn delete_entity(
    entity_repo: &dyn EntityRepository,
    link_repo: &dyn LinkRepository,
    project_id: &str,
    entity_id: &str,
) -> Result<bool, CoreError> {
    let mut entities = entity_repo.load_entities(project_id).await?;
    let Some(index) = entities.iter().position(|e| e.id() == entity_id) else {
        return Ok(false);
    };

    check_delete_guards(&entities, &entities[index])?;

    let mut links = link_repo.load_links(project_id).await?;
    let link_count = links.len();
    links.retain(|link| link.source_id != entity_id && link.target_id != entity_id);

    entities.remove(index);

    if links.len() != link_count {
        link_repo.save_links(project_id, &links).await?;
    }
    entity_repo.save_entities(project_id, &entities).await?;
    Ok(true)
}

fn check_delete_guards(entities: &[Entity], target: &Entity) -> Result<(), CoreError> {
    let target_id = target.id();
    match target.kind() {
        NodeKind::SymbolDefinition => {
            let referenced = entities.iter().any(|e| {
                matches!(e, Entity::SymbolInstance(i) if i.symbol_definition_id == target_id)
            });
            if referenced {
                return Err(CoreError::Conflict(
                    "Cannot delete symbol_definition with existing instances".to_string(),
                ));
            }
        }
        NodeKind::ComponentDefinition => {
            let referenced = entities.iter().any(|e| {
                matches!(e, Entity::ComponentInstance(i) if i.component_definition_id == target_id)
            });
            if referenced {
                return Err(CoreError::Conflict(
                    "Cannot delete component_definition with existing instances".to_string(),
                ));
            }
        }
        NodeKind::Legend | NodeKind::Schedule | NodeKind::AssemblyGroup => {
            let has_children = entities
                .iter()
                .any(|e| e.parent_container_id() == Some(target_id));
            if has_children {
                return Err(CoreError::Conflict(format!(
                    "Cannot delete {} with existing child items",
                    target.kind()
                )));
            }
        }
        NodeKind::LegendItem | NodeKind::ScheduleItem | NodeKind::Assembly => {
            let referenced = entities.iter().any(|e| {
                matches!(e, Entity::SymbolInstance(i)
                    if i.definition_item_id.as_deref() == Some(target_id))
            });
            if referenced {
                return Err(CoreError::Conflict(format!(
                    "Cannot delete {} referenced by a symbol instance",
                    target.kind()
                )));
            }
        }
        _ => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn optional_bbox(coords: Option<Vec<f64>>) -> Result<Option<BoundingBox>, CoreError> {
    coords.map(|c| BoundingBox::from_coords(&c)).transpose()
}

fn patched_bbox(
    current: Option<BoundingBox>,
    patch: &Patch<Vec<f64>>,
) -> Result<Option<BoundingBox>, CoreError> {
    match patch {
        Patch::Unset => Ok(current),
        Patch::Null => Ok(None),
        Patch::Value(coords) => Ok(Some(BoundingBox::from_coords(coords)?)),
    }
}

fn required_bbox(
    current: BoundingBox,
    patch: &Patch<Vec<f64>>,
    kind: NodeKind,
) -> Result<BoundingBox, CoreError> {
    match patch {
        Patch::Unset => Ok(current),
        Patch::Null => Err(CoreError::Validation(format!(
            "{kind}: bounding_box is required and cannot be cleared"
        ))),
        Patch::Value(coords) => BoundingBox::from_coords(coords),
    }
}

fn required_sheet(current: u32, patch: &Patch<u32>, kind: NodeKind) -> Result<u32, CoreError> {
    match patch {
        Patch::Unset => Ok(current),
        Patch::Null => Err(CoreError::Validation(format!(
            "{kind}: source_sheet_number is required and cannot be cleared"
        ))),
        Patch::Value(sheet) => Ok(*sheet),
    }
}

fn required_string(
    current: &str,
    patch: &Patch<String>,
    field: &str,
    kind: NodeKind,
) -> Result<String, CoreError> {
    match patch {
        Patch::Unset => Ok(current.to_string()),
        Patch::Null => Err(CoreError::Validation(format!(
            "{kind}: {field} is required and cannot be cleared"
        ))),
        Patch::Value(value) => Ok(value.clone()),
    }
}

fn required_scope(
    current: DefinitionScope,
    patch: &Patch<DefinitionScope>,
) -> Result<DefinitionScope, CoreError> {
    match patch {
        Patch::Unset => Ok(current),
        Patch::Null => Err(CoreError::Validation(
            "scope must be 'project' or 'sheet'".to_string(),
        )),
        Patch::Value(scope) => Ok(*scope),
    }
}

fn required_ref(
    current: &str,
    patch: &Patch<NodeId>,
    entities: &[Entity],
    expected: NodeKind,
) -> Result<NodeId, CoreError> {
    match patch {
        Patch::Unset => Ok(current.to_string()),
        Patch::Null => Err(CoreError::Validation(format!(
            "{expected} reference is required and cannot be cleared"
        ))),
        Patch::Value(id) => {
            ensure_kind(entities, id, expected)?;
            Ok(id.clone())
        }
    }
}

fn optional_ref(
    current: Option<NodeId>,
    patch: &Patch<NodeId>,
    entities: &[Entity],
    expected: NodeKind,
) -> Result<Option<NodeId>, CoreError> {
    match patch {
        Patch::Unset => Ok(current),
        Patch::Null => Ok(None),
        Patch::Value(id) => {
            ensure_kind(entities, id, expected)?;
            Ok(Some(id.clone()))
        }
    }
}

fn apply_common(
    status: &mut Option<EntityStatus>,
    validation: &mut Option<ValidationInfo>,
    patch: &EntityPatch,
) {
    *status = patch.status.clone().resolve(status.take());
    *validation = patch.validation.clone().resolve(validation.take());
}

/// Grounding marker for page-anchored entities.
///
/// An entity without a box is flagged `incomplete` with
/// `validation.missing.bounding_box = true`; attaching a box clears the flag.
fn grounding_marker(
    status: Option<EntityStatus>,
    validation: Option<ValidationInfo>,
    has_bbox: bool,
) -> (Option<EntityStatus>, Option<ValidationInfo>) {
    if has_bbox {
        let validation = validation.and_then(|mut info| {
            if let Some(missing) = &mut info.missing {
                missing.bounding_box = None;
                if *missing == MissingValidation::default() {
                    info.missing = None;
                }
            }
            if info == ValidationInfo::default() {
                None
            } else {
                Some(info)
            }
        });
        (status, validation)
    } else {
        let mut info = validation.unwrap_or_default();
        info.missing.get_or_insert_with(MissingValidation::default).bounding_box = Some(true);
        (
            Some(status.unwrap_or(EntityStatus::Incomplete)),
            Some(info),
        )
    }
}

fn validate_definition_scope(
    definition: &Entity,
    instance_sheet: Option<u32>,
) -> Result<(), CoreError> {
    let (scope, def_sheet, name) = match definition {
        Entity::SymbolDefinition(d) => (d.scope, d.source_sheet_number, d.name.as_str()),
        Entity::ComponentDefinition(d) => (d.scope, d.source_sheet_number, d.name.as_str()),
        _ => return Ok(()),
    };
    if scope == DefinitionScope::Sheet {
        if let Some(sheet) = instance_sheet {
            if sheet != def_sheet {
                return Err(CoreError::Scope(format!(
                    "Definition '{name}' is sheet-scoped to sheet {def_sheet} and cannot be \
                     instantiated on sheet {sheet}"
                )));
            }
        }
    }
    Ok(())
}

fn ensure_definition_item(
    entities: &[Entity],
    item_id: &str,
    declared: DefinitionItemKind,
) -> Result<(), CoreError> {
    let item = find_entity(entities, item_id).ok_or_else(|| CoreError::NotFound {
        node: "definition_item",
        id: item_id.to_string(),
    })?;
    if item.kind() != declared.node_kind() {
        return Err(CoreError::Reference(format!(
            "definition_item_type mismatch: '{item_id}' is a {}, declared {}",
            item.kind(),
            declared.node_kind()
        )));
    }
    Ok(())
}

fn resolve_defined_in(
    explicit: Option<NodeId>,
    bbox: &BoundingBox,
    sheet: u32,
    entities: &[Entity],
    parent_kind: NodeKind,
) -> Option<NodeId> {
    if explicit.is_some() {
        return explicit;
    }
    let candidates = linking_candidates(entities, sheet);
    find_intersecting_parent(bbox, sheet, &candidates, parent_kind)
        .map(|parent| parent.id().to_string())
}

fn resolve_instantiated_in(
    bbox: &Option<BoundingBox>,
    sheet: Option<u32>,
    entities: &[Entity],
) -> Option<NodeId> {
    let (bbox, sheet) = match (bbox, sheet) {
        (Some(bbox), Some(sheet)) => (bbox, sheet),
        _ => return None,
    };
    let candidates = linking_candidates(entities, sheet);
    find_containing_drawing(bbox, sheet, &candidates).map(|drawing| drawing.id().to_string())
}

// ---------------------------------------------------------------------------
// Tests (pure helpers; workflow coverage lives in tests/)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn sheet_scoped_definition(sheet: u32) -> Entity {
        Entity::SymbolDefinition(SymbolDefinition {
            id: "def1".into(),
            source_sheet_number: sheet,
            bounding_box: BoundingBox::new(0.0, 0.0, 10.0, 10.0).unwrap(),
            name: "W1".into(),
            description: None,
            visual_pattern_description: None,
            scope: DefinitionScope::Sheet,
            defined_in_id: None,
            created_at: Utc::now(),
            status: None,
            validation: None,
        })
    }

    #[test]
    fn sheet_scoped_definition_rejects_other_sheet() {
        let def = sheet_scoped_definition(1);
        let err = validate_definition_scope(&def, Some(2)).unwrap_err();
        assert_matches!(err, CoreError::Scope(_));
    }

    #[test]
    fn sheet_scoped_definition_allows_same_sheet() {
        let def = sheet_scoped_definition(3);
        assert!(validate_definition_scope(&def, Some(3)).is_ok());
    }

    #[test]
    fn sheet_scoped_definition_allows_conceptual_instance() {
        let def = sheet_scoped_definition(1);
        assert!(validate_definition_scope(&def, None).is_ok());
    }

    #[test]
    fn project_scoped_definition_allows_any_sheet() {
        let mut def = sheet_scoped_definition(1);
        if let Entity::SymbolDefinition(d) = &mut def {
            d.scope = DefinitionScope::Project;
        }
        assert!(validate_definition_scope(&def, Some(7)).is_ok());
    }

    #[test]
    fn grounding_marker_flags_missing_bbox() {
        let (status, validation) = grounding_marker(None, None, false);
        assert_eq!(status, Some(EntityStatus::Incomplete));
        let missing = validation.unwrap().missing.unwrap();
        assert_eq!(missing.bounding_box, Some(true));
    }

    #[test]
    fn grounding_marker_keeps_explicit_status() {
        let (status, _) = grounding_marker(Some(EntityStatus::Complete), None, false);
        assert_eq!(status, Some(EntityStatus::Complete));
    }

    #[test]
    fn grounding_marker_clears_flag_when_grounded() {
        let flagged = ValidationInfo {
            missing: Some(MissingValidation {
                bounding_box: Some(true),
                ..Default::default()
            }),
        };
        let (_, validation) = grounding_marker(None, Some(flagged), true);
        assert!(validation.is_none());
    }

    #[test]
    fn grounding_marker_preserves_other_flags() {
        let flagged = ValidationInfo {
            missing: Some(MissingValidation {
                bounding_box: Some(true),
                drawing: Some(true),
                ..Default::default()
            }),
        };
        let (_, validation) = grounding_marker(None, Some(flagged), true);
        let missing = validation.unwrap().missing.unwrap();
        assert_eq!(missing.bounding_box, None);
        assert_eq!(missing.drawing, Some(true));
    }
}
