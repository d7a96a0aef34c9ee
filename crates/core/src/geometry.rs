//! Bounding-box value type and spatial predicates.
//!
//! All persisted boxes live in unrotated document-point space (origin
//! top-left, y down). Predicates are pure and know nothing about entities.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum accepted coordinate magnitude, in points.
pub const MAX_COORD_MAGNITUDE: f64 = 1e8;

// ---------------------------------------------------------------------------
// BoundingBox
// ---------------------------------------------------------------------------

/// Axis-aligned bounding box in document-point space.
///
/// Invariant: `x2 > x1` and `y2 > y1` strictly; all coordinates finite and
/// bounded by [`MAX_COORD_MAGNITUDE`]. Construct through [`BoundingBox::new`]
/// or [`BoundingBox::from_coords`] so the invariant always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Build a box from already-ordered coordinates, validating the invariant.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, CoreError> {
        for v in [x1, y1, x2, y2] {
            if !v.is_finite() {
                return Err(CoreError::Validation(
                    "bounding_box coordinates must be finite numbers".to_string(),
                ));
            }
            if v.abs() > MAX_COORD_MAGNITUDE {
                return Err(CoreError::Validation(format!(
                    "bounding_box coordinate {v} exceeds the maximum magnitude of {MAX_COORD_MAGNITUDE}"
                )));
            }
        }
        if x2 <= x1 || y2 <= y1 {
            return Err(CoreError::Validation(
                "bounding_box must have x2 > x1 and y2 > y1".to_string(),
            ));
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    /// Validate a wire-format `[x1, y1, x2, y2]` coordinate list.
    pub fn from_coords(coords: &[f64]) -> Result<Self, CoreError> {
        if coords.len() != 4 {
            return Err(CoreError::Validation(format!(
                "bounding_box must have exactly 4 values [x1, y1, x2, y2], got {}",
                coords.len()
            )));
        }
        Self::new(coords[0], coords[1], coords[2], coords[3])
    }

    /// Return the box as a `[x1, y1, x2, y2]` array.
    pub fn as_array(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// True if the two boxes overlap with positive area on both axes.
///
/// Touching edges do not count as intersection.
pub fn intersects(a: &BoundingBox, b: &BoundingBox) -> bool {
    !(a.x2 <= b.x1 || a.x1 >= b.x2 || a.y2 <= b.y1 || a.y1 >= b.y2)
}

/// True if `outer` fully contains `inner`, inclusive on all four sides.
pub fn contains(outer: &BoundingBox, inner: &BoundingBox) -> bool {
    outer.x1 <= inner.x1 && outer.y1 <= inner.y1 && outer.x2 >= inner.x2 && outer.y2 >= inner.y2
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
