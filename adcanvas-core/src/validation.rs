//! Brand rule validation of a rendered scene.
//!
//! Violations are values, not errors: [`validate_canvas`] always returns,
//! and the same scene always yields the same list in the same order.

use kurbo::Rect;
use serde::Serialize;

use crate::element::{ObjectId, SceneObject};
use crate::platform::{Platform, SAFE_ZONE_BOTTOM, SAFE_ZONE_TOP};
use crate::scene::Scene;

/// Which rule a violation broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    /// Canvas size differs from the platform's.
    CanvasSize,
    /// Object reaches above the top safe zone.
    TopSafeZone,
    /// Object reaches below the bottom safe zone.
    BottomSafeZone,
    /// Text below the platform's minimum font size.
    FontSize,
}

/// One rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Offending object; absent for whole-canvas violations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Broken rule.
    pub kind: ViolationKind,
    /// Human-readable message.
    pub message: String,
}

impl ValidationError {
    fn canvas(platform: Platform) -> Self {
        let (width, height) = platform.canvas_size();
        Self {
            id: None,
            kind: ViolationKind::CanvasSize,
            message: format!("Canvas must be {width}x{height}"),
        }
    }

    fn object(id: ObjectId, kind: ViolationKind, message: String) -> Self {
        Self {
            id: Some(id),
            kind,
            message,
        }
    }
}

/// Bounding box of an object in absolute logical canvas units, after its own
/// origin, scale, skew and rotation.
///
/// The viewport zoom is not applied: safe-zone thresholds are logical, so
/// the box is compared as-is at any zoom level.
#[must_use]
pub fn rendered_bounds(object: &SceneObject) -> Rect {
    object.bounding_box()
}

/// Validate every object in `scene` against `platform`'s rules for a canvas
/// of logical size `width`×`height`.
///
/// Objects are visited in paint order. Guides are ignored.
#[must_use]
pub fn validate_canvas(
    scene: &Scene,
    platform: Platform,
    width: u32,
    height: u32,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let layout_rules = platform.enforces_layout_rules();

    if layout_rules && (width, height) != platform.canvas_size() {
        errors.push(ValidationError::canvas(platform));
    }

    let bottom_limit = f64::from(height) - SAFE_ZONE_BOTTOM;
    for object in scene.objects().filter(|o| !o.guide) {
        if layout_rules {
            let bounds = rendered_bounds(object);
            if bounds.y0 < SAFE_ZONE_TOP {
                errors.push(ValidationError::object(
                    object.id,
                    ViolationKind::TopSafeZone,
                    "Element violates top safe zone".to_string(),
                ));
            }
            if bounds.y1 > bottom_limit {
                errors.push(ValidationError::object(
                    object.id,
                    ViolationKind::BottomSafeZone,
                    "Element violates bottom safe zone".to_string(),
                ));
            }
        }

        if let Some(text) = object.text() {
            let min = platform.min_font_size();
            // A missing size always fails.
            if text.font_size.unwrap_or(0.0) < min {
                errors.push(ValidationError::object(
                    object.id,
                    ViolationKind::FontSize,
                    format!("Font size too small (min {min}px)"),
                ));
            }
        }
    }

    tracing::info!(
        ?platform,
        objects = scene.len(),
        violations = errors.len(),
        "Canvas validated"
    );
    errors
}
