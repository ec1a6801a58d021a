//! Outlines objects that failed validation.

use crate::scene::Scene;
use crate::validation::ValidationError;

/// Stroke color applied to offending objects.
pub const HIGHLIGHT_STROKE: &str = "red";
/// Stroke width applied to offending objects.
pub const HIGHLIGHT_STROKE_WIDTH: f64 = 2.0;

/// Flag every object named by `errors` and clear all earlier flags.
///
/// Every non-guide object loses its stroke first, so repeated calls with the
/// same list leave the scene unchanged. Errors without an id, and ids no
/// longer in the scene, are skipped. Returns how many objects were flagged.
pub fn mark_validation_errors(scene: &mut Scene, errors: &[ValidationError]) -> usize {
    for object in scene.objects_mut().filter(|o| !o.guide) {
        object.stroke = None;
        object.stroke_width = 0.0;
    }

    let mut marked = 0;
    for id in errors.iter().filter_map(|e| e.id) {
        match scene.get_mut(id) {
            Some(object) if !object.guide => {
                if object.stroke.is_none() {
                    marked += 1;
                }
                object.stroke = Some(HIGHLIGHT_STROKE.to_string());
                object.stroke_width = HIGHLIGHT_STROKE_WIDTH;
            }
            Some(_) => {}
            None => tracing::debug!(%id, "Flagged object no longer in scene"),
        }
    }

    scene.request_render_all();
    marked
}
