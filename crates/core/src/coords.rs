//! Coordinate conversion between canvas pixel space and document point space.
//!
//! Persisted bounding boxes are always stored in unrotated document-point
//! space (origin top-left, y down). Canvas space is the raster image shown to
//! the user, possibly rotated relative to the page. Conversions normalize
//! coordinate order, reject NaN and unreasonable magnitudes, and clamp the
//! document-space result to the page plus a small tolerance so malformed
//! client input cannot persist far-out geometry.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geometry::MAX_COORD_MAGNITUDE;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Clamp tolerance around the page edges, in points.
pub const CLAMP_EPSILON_PTS: f64 = 0.5;

// ---------------------------------------------------------------------------
// Rotation
// ---------------------------------------------------------------------------

/// Page rotation of the rendered raster, in degrees.
///
/// Only the four axis-aligned rotations are supported; anything else is a
/// reported error at the serde boundary, never silently normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Parse a rotation from degrees.
    pub fn from_degrees(degrees: u16) -> Result<Self, CoreError> {
        match degrees {
            0 => Ok(Self::R0),
            90 => Ok(Self::R90),
            180 => Ok(Self::R180),
            270 => Ok(Self::R270),
            other => Err(CoreError::Validation(format!(
                "Unsupported rotation {other}. Must be one of: 0, 90, 180, 270"
            ))),
        }
    }

    /// Rotation in degrees.
    pub fn degrees(self) -> u16 {
        match self {
            Self::R0 => 0,
            Self::R90 => 90,
            Self::R180 => 180,
            Self::R270 => 270,
        }
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::from_degrees(value).map_err(|e| e.to_string())
    }
}

impl From<Rotation> for u16 {
    fn from(value: Rotation) -> Self {
        value.degrees()
    }
}

// ---------------------------------------------------------------------------
// RenderMeta
// ---------------------------------------------------------------------------

/// Metadata about one rendered page, used only by coordinate transforms.
///
/// Produced per sheet by the external ingestion pipeline (PDF rasterization).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderMeta {
    pub page_width_pts: f64,
    pub page_height_pts: f64,
    pub raster_width_px: u32,
    pub raster_height_px: u32,
    #[serde(default)]
    pub rotation: Rotation,
}

impl RenderMeta {
    /// Horizontal scale factor, raster pixels per page point.
    pub fn scale_x(&self) -> f64 {
        f64::from(self.raster_width_px) / self.page_width_pts
    }

    /// Vertical scale factor, raster pixels per page point.
    pub fn scale_y(&self) -> f64 {
        f64::from(self.raster_height_px) / self.page_height_pts
    }
}

// ---------------------------------------------------------------------------
// Box normalization and clamping
// ---------------------------------------------------------------------------

/// Sort a raw `[x1, y1, x2, y2]` box into canonical order, rejecting NaN and
/// unreasonable magnitudes.
///
/// Unlike [`crate::geometry::BoundingBox`], a zero-area box is acceptable
/// here; strictness is enforced when a box is attached to an entity.
fn normalize_box(box4: [f64; 4]) -> Result<[f64; 4], CoreError> {
    let [mut x1, mut y1, mut x2, mut y2] = box4;
    for v in [x1, y1, x2, y2] {
        if v.is_nan() {
            return Err(CoreError::Validation("box contains NaN".to_string()));
        }
        if v.abs() > MAX_COORD_MAGNITUDE {
            return Err(CoreError::Validation(format!(
                "box coordinate {v} exceeds the maximum magnitude of {MAX_COORD_MAGNITUDE}"
            )));
        }
    }
    if x1 > x2 {
        std::mem::swap(&mut x1, &mut x2);
    }
    if y1 > y2 {
        std::mem::swap(&mut y1, &mut y2);
    }
    Ok([x1, y1, x2, y2])
}

/// Clamp a document-space box to `[-ε, page_dim + ε]` on both axes.
fn clamp_document_box(box4: [f64; 4], meta: &RenderMeta) -> Result<[f64; 4], CoreError> {
    let clamp = |v: f64, dim: f64| v.clamp(-CLAMP_EPSILON_PTS, dim + CLAMP_EPSILON_PTS);
    normalize_box([
        clamp(box4[0], meta.page_width_pts),
        clamp(box4[1], meta.page_height_pts),
        clamp(box4[2], meta.page_width_pts),
        clamp(box4[3], meta.page_height_pts),
    ])
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

/// Convert a canvas-space box into unrotated document-point space.
///
/// The input is normalized, un-rotated back to raster orientation, scaled to
/// points, and clamped to the page window. Out-of-bounds input is clamped
/// rather than rejected, so round-trip identity holds only for boxes that
/// start inside the clamp window.
pub fn canvas_to_document(box4: [f64; 4], meta: &RenderMeta) -> Result<[f64; 4], CoreError> {
    let [cx1, cy1, cx2, cy2] = normalize_box(box4)?;

    let rw = f64::from(meta.raster_width_px);
    let rh = f64::from(meta.raster_height_px);

    let unrotate = |x: f64, y: f64| -> (f64, f64) {
        match meta.rotation {
            Rotation::R0 => (x, y),
            Rotation::R90 => (y, rw - x),
            Rotation::R180 => (rw - x, rh - y),
            Rotation::R270 => (rh - y, x),
        }
    };

    let (ux1, uy1) = unrotate(cx1, cy1);
    let (ux2, uy2) = unrotate(cx2, cy2);
    let [ux1, uy1, ux2, uy2] = normalize_box([ux1, uy1, ux2, uy2])?;

    // Raster pixels -> document points.
    let doc = normalize_box([
        ux1 / meta.scale_x(),
        uy1 / meta.scale_y(),
        ux2 / meta.scale_x(),
        uy2 / meta.scale_y(),
    ])?;
    clamp_document_box(doc, meta)
}

/// Convert an unrotated document-point box into canvas pixel space.
///
/// Clamps first to avoid projecting far-out coordinates, then scales to
/// raster pixels and applies the forward rotation.
pub fn document_to_canvas(box4: [f64; 4], meta: &RenderMeta) -> Result<[f64; 4], CoreError> {
    let normalized = normalize_box(box4)?;
    let [px1, py1, px2, py2] = clamp_document_box(normalized, meta)?;

    let [ux1, uy1, ux2, uy2] = normalize_box([
        px1 * meta.scale_x(),
        py1 * meta.scale_y(),
        px2 * meta.scale_x(),
        py2 * meta.scale_y(),
    ])?;

    let rw = f64::from(meta.raster_width_px);
    let rh = f64::from(meta.raster_height_px);

    let rotate = |x: f64, y: f64| -> (f64, f64) {
        match meta.rotation {
            Rotation::R0 => (x, y),
            Rotation::R90 => (rw - y, x),
            Rotation::R180 => (rw - x, rh - y),
            Rotation::R270 => (y, rh - x),
        }
    };

    let (cx1, cy1) = rotate(ux1, uy1);
    let (cx2, cy2) = rotate(ux2, uy2);
    normalize_box([cx1, cy1, cx2, cy2])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    fn meta(pw: f64, ph: f64, rw: u32, rh: u32, rotation: Rotation) -> RenderMeta {
        RenderMeta {
            page_width_pts: pw,
            page_height_pts: ph,
            raster_width_px: rw,
            raster_height_px: rh,
            rotation,
        }
    }

    fn assert_box_eq(a: [f64; 4], b: [f64; 4]) {
        for (va, vb) in a.iter().zip(b.iter()) {
            assert!((va - vb).abs() < TOLERANCE, "{a:?} != {b:?}");
        }
    }

    // -- round trips -------------------------------------------------------

    #[test]
    fn round_trip_identity_no_rotation() {
        let m = meta(1000.0, 500.0, 2000, 1000, Rotation::R0);
        let canvas = [100.0, 50.0, 400.0, 300.0];
        let doc = canvas_to_document(canvas, &m).unwrap();
        let back = document_to_canvas(doc, &m).unwrap();
        assert_box_eq(canvas, back);
    }

    #[test]
    fn round_trip_identity_all_rotations() {
        // Square page and raster so every rotation keeps the box in bounds.
        for rotation in [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270] {
            let m = meta(100.0, 100.0, 200, 200, rotation);
            let canvas = [40.0, 30.0, 120.0, 90.0];
            let doc = canvas_to_document(canvas, &m).unwrap();
            let back = document_to_canvas(doc, &m).unwrap();
            assert_box_eq(canvas, back);
        }
    }

    #[test]
    fn document_canvas_document_consistency() {
        let m = meta(100.0, 100.0, 300, 300, Rotation::R0);
        let doc = [10.0, 20.0, 40.0, 60.0];
        let canvas = document_to_canvas(doc, &m).unwrap();
        let back = canvas_to_document(canvas, &m).unwrap();
        assert_box_eq(doc, back);
    }

    #[test]
    fn non_uniform_scale_round_trip() {
        let m = meta(100.0, 200.0, 400, 600, Rotation::R0);
        let canvas = [40.0, 120.0, 200.0, 480.0];
        let doc = canvas_to_document(canvas, &m).unwrap();
        let back = document_to_canvas(doc, &m).unwrap();
        assert_box_eq(canvas, back);
    }

    // -- normalization and clamping ----------------------------------------

    #[test]
    fn unordered_input_is_normalized() {
        let m = meta(100.0, 100.0, 100, 100, Rotation::R0);
        let doc = canvas_to_document([80.0, 90.0, 20.0, 10.0], &m).unwrap();
        assert_box_eq(doc, [20.0, 10.0, 80.0, 90.0]);
    }

    #[test]
    fn out_of_bounds_canvas_is_clamped_to_page_window() {
        let m = meta(100.0, 100.0, 200, 200, Rotation::R0);
        let doc = canvas_to_document([-50.0, -10.0, 500.0, 400.0], &m).unwrap();
        for v in doc {
            assert!((-CLAMP_EPSILON_PTS..=100.0 + CLAMP_EPSILON_PTS).contains(&v), "{v}");
        }
    }

    #[test]
    fn clamp_applies_for_every_rotation() {
        for rotation in [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270] {
            let m = meta(100.0, 100.0, 200, 200, rotation);
            let doc = canvas_to_document([-1000.0, -1000.0, 1000.0, 1000.0], &m).unwrap();
            assert!(doc[0] >= -CLAMP_EPSILON_PTS && doc[2] <= 100.0 + CLAMP_EPSILON_PTS);
            assert!(doc[1] >= -CLAMP_EPSILON_PTS && doc[3] <= 100.0 + CLAMP_EPSILON_PTS);
        }
    }

    #[test]
    fn document_to_canvas_clamps_before_projecting() {
        let m = meta(100.0, 100.0, 200, 200, Rotation::R0);
        let canvas = document_to_canvas([-500.0, 0.0, 50.0, 50.0], &m).unwrap();
        // -500 clamps to -0.5 pts, which projects to -1 px.
        assert_box_eq(canvas, [-1.0, 0.0, 100.0, 100.0]);
    }

    // -- rejection ---------------------------------------------------------

    #[test]
    fn nan_coordinates_rejected() {
        let m = meta(100.0, 100.0, 200, 200, Rotation::R0);
        assert!(canvas_to_document([f64::NAN, 0.0, 1.0, 1.0], &m).is_err());
    }

    #[test]
    fn excessive_magnitude_rejected() {
        let m = meta(100.0, 100.0, 200, 200, Rotation::R0);
        assert!(canvas_to_document([0.0, 0.0, 1e9, 1.0], &m).is_err());
    }

    #[test]
    fn unsupported_rotation_rejected_in_serde() {
        let err = serde_json::from_value::<Rotation>(serde_json::json!(45)).unwrap_err();
        assert!(err.to_string().contains("Unsupported rotation"));
    }

    #[test]
    fn rotation_from_degrees_round_trip() {
        for d in [0u16, 90, 180, 270] {
            assert_eq!(Rotation::from_degrees(d).unwrap().degrees(), d);
        }
        assert!(Rotation::from_degrees(30).is_err());
    }

    // -- scale factors -----------------------------------------------------

    #[test]
    fn scale_factors_are_per_axis() {
        let m = meta(100.0, 200.0, 400, 600, Rotation::R0);
        assert!((m.scale_x() - 4.0).abs() < TOLERANCE);
        assert!((m.scale_y() - 3.0).abs() < TOLERANCE);
    }
}
