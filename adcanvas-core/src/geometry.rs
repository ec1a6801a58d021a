//! Origin resolution and bounding-box geometry.
//!
//! A [`Placement`] stores the anchor point an object was authored with
//! (`left`, `top`, `originX`, `originY`) instead of a resolved corner. Every
//! derived quantity (center, affine transform, bounding box) is recomputed
//! from the object's *current* intrinsic size, so the anchor stays put when
//! text re-wraps or an image finishes loading.
//!
//! The composition order matches the editor's scene graph:
//!
//! ```text
//! viewport(zoom, pan) · translate(center) · rotate(angle) · scale · skewX · skewY
//! ```

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Padding kept around the canvas when fitting it into a container.
pub const FIT_PADDING: f64 = 60.0;

/// Horizontal anchor of an object's declared position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginX {
    /// `left` is the object's left edge.
    #[default]
    Left,
    /// `left` is the object's horizontal center.
    Center,
    /// `left` is the object's right edge.
    Right,
}

impl OriginX {
    /// Fraction of the object's width between its left edge and the anchor.
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::Left => 0.0,
            Self::Center => 0.5,
            Self::Right => 1.0,
        }
    }

    /// Parse an origin name, returning `None` for anything unrecognized.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Vertical anchor of an object's declared position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginY {
    /// `top` is the object's top edge.
    #[default]
    Top,
    /// `top` is the object's vertical center.
    Center,
    /// `top` is the object's bottom edge.
    Bottom,
}

impl OriginY {
    /// Fraction of the object's height between its top edge and the anchor.
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::Top => 0.0,
            Self::Center => 0.5,
            Self::Bottom => 1.0,
        }
    }

    /// Parse an origin name, returning `None` for anything unrecognized.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "top" => Some(Self::Top),
            "center" => Some(Self::Center),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// Anchored position, rotation, scale and skew of a scene object.
///
/// Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// Anchor X in logical canvas units.
    pub left: f64,
    /// Anchor Y in logical canvas units.
    pub top: f64,
    /// Horizontal anchor.
    pub origin_x: OriginX,
    /// Vertical anchor.
    pub origin_y: OriginY,
    /// Clockwise rotation about the anchor, in degrees.
    pub angle: f64,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
    /// Horizontal skew in degrees.
    pub skew_x: f64,
    /// Vertical skew in degrees.
    pub skew_y: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            origin_x: OriginX::Left,
            origin_y: OriginY::Top,
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            skew_x: 0.0,
            skew_y: 0.0,
        }
    }
}

impl Placement {
    /// Placement anchored by its top-left corner at `(left, top)`.
    #[must_use]
    pub fn at(left: f64, top: f64) -> Self {
        Self {
            left,
            top,
            ..Self::default()
        }
    }

    /// Set the anchor.
    #[must_use]
    pub fn with_origin(mut self, origin_x: OriginX, origin_y: OriginY) -> Self {
        self.origin_x = origin_x;
        self.origin_y = origin_y;
        self
    }

    /// Set the rotation in degrees.
    #[must_use]
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    /// Set a uniform scale.
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale_x = scale;
        self.scale_y = scale;
        self
    }

    /// The declared anchor point.
    #[must_use]
    pub fn anchor(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Scale and skew, without translation or rotation.
    fn shape_transform(&self) -> Affine {
        Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::skew(self.skew_x.to_radians().tan(), 0.0)
            * Affine::skew(0.0, self.skew_y.to_radians().tan())
    }

    /// Width and height of the object after scale and skew, before rotation.
    #[must_use]
    pub fn transformed_size(&self, width: f64, height: f64) -> Vec2 {
        let bbox = self
            .shape_transform()
            .transform_rect_bbox(local_rect(width, height));
        Vec2::new(bbox.width(), bbox.height())
    }

    /// The object's center in logical canvas units.
    ///
    /// The anchor named by the origin pair lands on `(left, top)`, and the
    /// offset to the center is rotated about that anchor.
    #[must_use]
    pub fn center_point(&self, width: f64, height: f64) -> Point {
        let size = self.transformed_size(width, height);
        let offset = Vec2::new(
            (0.5 - self.origin_x.factor()) * size.x,
            (0.5 - self.origin_y.factor()) * size.y,
        );
        self.anchor() + rotate(offset, self.angle)
    }

    /// Affine mapping object-local coordinates (centered on the origin) to
    /// logical canvas coordinates.
    #[must_use]
    pub fn transform(&self, width: f64, height: f64) -> Affine {
        let center = self.center_point(width, height);
        Affine::translate(center.to_vec2())
            * Affine::rotate(self.angle.to_radians())
            * self.shape_transform()
    }

    /// Axis-aligned bounding box in logical canvas units.
    #[must_use]
    pub fn bounding_box(&self, width: f64, height: f64) -> Rect {
        self.transform(width, height)
            .transform_rect_bbox(local_rect(width, height))
    }

    /// Uniform scale at which the bounding box is `value` units tall.
    ///
    /// Returns `None` when the object has no measurable height.
    #[must_use]
    pub fn uniform_scale_for_height(&self, width: f64, height: f64, value: f64) -> Option<f64> {
        let unit = self.with_scale(1.0).bounding_box(width, height).height();
        (unit.is_finite() && unit > 0.0).then(|| value / unit)
    }

    /// Uniform scale at which the bounding box is `value` units wide.
    ///
    /// Returns `None` when the object has no measurable width.
    #[must_use]
    pub fn uniform_scale_for_width(&self, width: f64, height: f64, value: f64) -> Option<f64> {
        let unit = self.with_scale(1.0).bounding_box(width, height).width();
        (unit.is_finite() && unit > 0.0).then(|| value / unit)
    }
}

/// Zoom and pan applied when the canvas is shown on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current zoom level (1.0 = 100%).
    pub zoom: f64,
    /// Pan offset X in screen pixels.
    pub pan_x: f64,
    /// Pan offset Y in screen pixels.
    pub pan_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl Viewport {
    /// Viewport with the given zoom and no pan.
    #[must_use]
    pub fn with_zoom(zoom: f64) -> Self {
        Self {
            zoom,
            ..Self::default()
        }
    }

    /// Zoom that fits a logical canvas into a container, keeping
    /// [`FIT_PADDING`] clear.
    #[must_use]
    pub fn fit(container_width: f64, container_height: f64, width: f64, height: f64) -> Self {
        let scale_x = (container_width - FIT_PADDING) / width;
        let scale_y = (container_height - FIT_PADDING) / height;
        Self::with_zoom(scale_x.min(scale_y))
    }

    fn is_invertible(&self) -> bool {
        self.zoom.is_finite() && self.zoom > 0.0
    }

    /// Logical-to-screen transform.
    #[must_use]
    pub fn transform(&self) -> Affine {
        Affine::translate((self.pan_x, self.pan_y)) * Affine::scale(self.zoom)
    }

    /// Map a logical rectangle to screen space.
    #[must_use]
    pub fn to_screen(&self, rect: Rect) -> Rect {
        self.transform().transform_rect_bbox(rect)
    }

    /// Map a screen rectangle back to logical canvas units.
    ///
    /// A degenerate zoom leaves the rectangle untouched.
    #[must_use]
    pub fn to_logical(&self, rect: Rect) -> Rect {
        if !self.is_invertible() {
            return rect;
        }
        self.transform().inverse().transform_rect_bbox(rect)
    }

    /// Raster multiplier that makes exports independent of the on-screen zoom.
    #[must_use]
    pub fn export_multiplier(&self, quality: f64) -> f64 {
        if self.is_invertible() {
            quality / self.zoom
        } else {
            quality
        }
    }
}

fn local_rect(width: f64, height: f64) -> Rect {
    Rect::new(-width / 2.0, -height / 2.0, width / 2.0, height / 2.0)
}

fn rotate(v: Vec2, degrees: f64) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn assert_rect(rect: Rect, x0: f64, y0: f64, x1: f64, y1: f64) {
        assert!(
            close(rect.x0, x0) && close(rect.y0, y0) && close(rect.x1, x1) && close(rect.y1, y1),
            "unexpected rect {rect:?}"
        );
    }

    #[test]
    fn test_center_origin_resolves_top_left() {
        let placement =
            Placement::at(300.0, 200.0).with_origin(OriginX::Center, OriginY::Center);
        let bbox = placement.bounding_box(100.0, 50.0);
        assert_rect(bbox, 250.0, 175.0, 350.0, 225.0);
    }

    #[test]
    fn test_right_bottom_origin() {
        let placement = Placement::at(300.0, 200.0).with_origin(OriginX::Right, OriginY::Bottom);
        let bbox = placement.bounding_box(100.0, 50.0);
        assert_rect(bbox, 200.0, 150.0, 300.0, 200.0);
    }

    #[test]
    fn test_rotation_pivots_on_anchor() {
        let placement = Placement::at(0.0, 0.0).with_angle(90.0);
        let bbox = placement.bounding_box(100.0, 50.0);
        assert_rect(bbox, -50.0, 0.0, 0.0, 100.0);
    }

    #[test]
    fn test_scale_grows_away_from_anchor() {
        let placement = Placement::at(10.0, 10.0).with_scale(2.0);
        let bbox = placement.bounding_box(100.0, 50.0);
        assert_rect(bbox, 10.0, 10.0, 210.0, 110.0);
    }

    #[test]
    fn test_anchor_stable_when_size_changes() {
        let placement =
            Placement::at(540.0, 960.0).with_origin(OriginX::Center, OriginY::Center);
        let before = placement.bounding_box(200.0, 40.0).center();
        let after = placement.bounding_box(420.0, 90.0).center();
        assert!(close(before.x, after.x) && close(before.y, after.y));
    }

    #[test]
    fn test_skew_widens_box() {
        let mut placement = Placement::at(0.0, 0.0);
        placement.skew_x = 45.0;
        let size = placement.transformed_size(100.0, 100.0);
        assert!(close(size.x, 200.0));
        assert!(close(size.y, 100.0));
    }

    #[test]
    fn test_uniform_scale_for_height() {
        let placement = Placement::at(0.0, 0.0).with_scale(3.0);
        let scale = placement
            .uniform_scale_for_height(100.0, 40.0, 200.0)
            .expect("measurable");
        assert!(close(scale, 5.0));
        assert!(placement.uniform_scale_for_height(100.0, 0.0, 200.0).is_none());
    }

    #[test]
    fn test_viewport_round_trip() {
        let viewport = Viewport {
            zoom: 0.5,
            pan_x: 30.0,
            pan_y: 30.0,
        };
        let logical = Rect::new(100.0, 200.0, 300.0, 400.0);
        let screen = viewport.to_screen(logical);
        assert_rect(screen, 80.0, 130.0, 180.0, 230.0);
        let back = viewport.to_logical(screen);
        assert_rect(back, 100.0, 200.0, 300.0, 400.0);
    }

    #[test]
    fn test_degenerate_zoom_is_identity_for_logical() {
        let viewport = Viewport::with_zoom(0.0);
        let rect = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(viewport.to_logical(rect), rect);
        assert!(close(viewport.export_multiplier(3.0), 3.0));
    }

    #[test]
    fn test_fit_story_into_container() {
        let viewport = Viewport::fit(1060.0, 1020.0, 1080.0, 1920.0);
        assert!(close(viewport.zoom, 0.5));
        assert!(close(viewport.export_multiplier(3.0), 6.0));
    }
}
