//! Safe-zone guide lines shown on story-sized canvases.

use crate::element::{LineObject, ObjectKind, SceneObject};
use crate::geometry::Placement;
use crate::platform::{Platform, SAFE_ZONE_BOTTOM, SAFE_ZONE_TOP};
use crate::scene::Scene;

/// Guide stroke color.
pub const GUIDE_STROKE: &str = "#ff6b6b";
/// Guide stroke width.
pub const GUIDE_STROKE_WIDTH: f64 = 2.0;
/// Guide dash pattern.
pub const GUIDE_DASH: [f64; 2] = [5.0, 5.0];
/// Guide opacity.
pub const GUIDE_OPACITY: f64 = 0.5;

fn guide_line(width: f64, y: f64) -> SceneObject {
    let mut line = SceneObject::new(ObjectKind::Line(LineObject {
        x1: 0.0,
        y1: 0.0,
        x2: width,
        y2: 0.0,
        dash: GUIDE_DASH.to_vec(),
    }))
    .with_placement(Placement::at(0.0, y));
    line.stroke = Some(GUIDE_STROKE.to_string());
    line.stroke_width = GUIDE_STROKE_WIDTH;
    line.opacity = GUIDE_OPACITY;
    line.selectable = false;
    line.guide = true;
    line
}

/// Replace the safe-zone guides without requesting a redraw.
///
/// Existing guides are always removed. New ones are placed, at the bottom of
/// the z-order, only when the scene has the story canvas size. Returns the
/// number of guides added.
pub fn place_safe_zone_guides(scene: &mut Scene) -> usize {
    scene.remove_where(|o| o.guide);
    if (scene.width, scene.height) != Platform::Social.canvas_size() {
        return 0;
    }

    let width = f64::from(scene.width);
    let height = f64::from(scene.height);
    for y in [SAFE_ZONE_TOP, height - SAFE_ZONE_BOTTOM] {
        scene.insert(0, guide_line(width, y));
    }
    2
}

/// Replace the safe-zone guides and redraw if any were added.
pub fn draw_safe_zone_guides(scene: &mut Scene) -> usize {
    let placed = place_safe_zone_guides(scene);
    if placed > 0 {
        scene.request_render_all();
    }
    placed
}
