//! Spatial auto-linking engine.
//!
//! Derives structural references (`defined_in_id`, `instantiated_in_id`)
//! from spatial overlap instead of explicit user choice. Both queries scan
//! candidates in the order given and return the first match; callers feed a
//! deterministically ordered list (creation time, then id) so results never
//! depend on incidental repository order.

use crate::entity::{Entity, NodeKind};
use crate::geometry::{contains, intersects, BoundingBox};

/// Find the first candidate of `parent_kind` on the same sheet whose box
/// intersects the child's box.
///
/// Used to link a symbol definition to its legend or a component definition
/// to its schedule.
pub fn find_intersecting_parent<'a>(
    child_bbox: &BoundingBox,
    child_sheet: u32,
    candidates: &'a [Entity],
    parent_kind: NodeKind,
) -> Option<&'a Entity> {
    candidates.iter().find(|candidate| {
        candidate.kind() == parent_kind
            && candidate.source_sheet_number() == Some(child_sheet)
            && candidate
                .bounding_box()
                .is_some_and(|bbox| intersects(child_bbox, bbox))
    })
}

/// Find the first drawing on the same sheet whose box fully contains the
/// instance's box.
pub fn find_containing_drawing<'a>(
    instance_bbox: &BoundingBox,
    instance_sheet: u32,
    candidates: &'a [Entity],
) -> Option<&'a Entity> {
    candidates.iter().find(|candidate| {
        candidate.kind() == NodeKind::Drawing
            && candidate.source_sheet_number() == Some(instance_sheet)
            && candidate
                .bounding_box()
                .is_some_and(|bbox| contains(bbox, instance_bbox))
    })
}
