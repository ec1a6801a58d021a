//! Element materialization: declarative descriptors to scene objects.
//!
//! Shapes and text materialize synchronously. Images need their pixels
//! first, so they come back as [`Materialized::Pending`] and are finished by
//! [`Materializer::finish_image`] once the loader resolves.

use tracing::debug;

use crate::defaults::ElementDefaults;
use crate::descriptor::{
    CircleDescriptor, CommonProps, ElementDescriptor, ImageDescriptor, RectDescriptor,
    ShadowDescriptor, SkipReason, TextDescriptor,
};
use crate::element::{
    Gradient, ImageFilter, ImageObject, ImagePixels, ObjectKind, Paint, SceneObject, Shadow,
    TextObject, TextVariant,
};
use crate::geometry::Placement;
use crate::layout::Texture;
use crate::loader::ImageRequest;

/// Outcome of materializing one descriptor.
#[derive(Debug, Clone)]
pub enum Materialized {
    /// A finished object.
    Ready(SceneObject),
    /// An image waiting for its pixels.
    Pending(PendingImage),
    /// The descriptor cannot be materialized.
    Skipped(SkipReason),
}

/// An image element whose pixels have been requested.
#[derive(Debug, Clone)]
pub struct PendingImage {
    /// What to load.
    pub request: ImageRequest,
    /// The descriptor to finish once loaded.
    pub descriptor: ImageDescriptor,
}

/// Builds scene objects from descriptors.
#[derive(Debug, Clone, Default)]
pub struct Materializer {
    defaults: ElementDefaults,
}

impl Materializer {
    /// Materializer using the given fallback table.
    #[must_use]
    pub fn new(defaults: ElementDefaults) -> Self {
        Self { defaults }
    }

    /// The fallback table in use.
    #[must_use]
    pub fn defaults(&self) -> &ElementDefaults {
        &self.defaults
    }

    /// Materialize one descriptor. Never fails; unusable descriptors are
    /// reported as [`Materialized::Skipped`].
    #[must_use]
    pub fn materialize(&self, descriptor: &ElementDescriptor) -> Materialized {
        match descriptor {
            ElementDescriptor::Rect(rect) => Materialized::Ready(self.rect(rect)),
            ElementDescriptor::Circle(circle) => Materialized::Ready(self.circle(circle)),
            ElementDescriptor::Text(text) => Materialized::Ready(self.text(text)),
            ElementDescriptor::Image(image) => Materialized::Pending(PendingImage {
                request: ImageRequest::anonymous(image.url.clone()),
                descriptor: image.clone(),
            }),
            ElementDescriptor::Invalid(invalid) => {
                debug!(
                    element_type = invalid.element_type.as_deref().unwrap_or("<none>"),
                    reason = %invalid.reason,
                    "Skipping element"
                );
                Materialized::Skipped(invalid.reason.clone())
            }
        }
    }

    fn rect(&self, d: &RectDescriptor) -> SceneObject {
        let mut object = SceneObject::new(ObjectKind::Rect {
            width: d.width.unwrap_or(0.0),
            height: d.height.unwrap_or(0.0),
            rx: d.rx.unwrap_or(0.0),
            ry: d.ry.unwrap_or(0.0),
        });
        object.fill = Some(self.shape_fill(d.gradient.as_ref(), d.fill.as_deref()));
        self.apply_common(&mut object, &d.common);
        object
    }

    fn circle(&self, d: &CircleDescriptor) -> SceneObject {
        let mut object = SceneObject::new(ObjectKind::Circle {
            radius: d.radius.unwrap_or(self.defaults.circle_radius),
        });
        object.fill = Some(self.shape_fill(d.gradient.as_ref(), d.fill.as_deref()));
        self.apply_common(&mut object, &d.common);
        object
    }

    fn text(&self, d: &TextDescriptor) -> SceneObject {
        let requested = d.font_size.unwrap_or(self.defaults.font_size);
        let base = self.defaults.base_font_size(requested);
        let mut object = SceneObject::new(ObjectKind::Text(TextObject {
            content: d.content.clone(),
            font_size: Some(base),
            font_family: d
                .font_family
                .clone()
                .unwrap_or_else(|| self.defaults.font_family.clone()),
            font_weight: d
                .font_weight
                .clone()
                .unwrap_or_else(|| self.defaults.font_weight.clone()),
            font_style: d
                .font_style
                .clone()
                .unwrap_or_else(|| self.defaults.font_style.clone()),
            char_spacing: d.char_spacing.unwrap_or(0.0),
            text_align: d.text_align.unwrap_or_default(),
            variant: TextVariant::IText,
        }));
        let fill = d
            .fill
            .clone()
            .or_else(|| d.color.clone())
            .unwrap_or_else(|| self.defaults.text_fill.clone());
        object.fill = Some(Paint::Color(fill));
        self.apply_common(&mut object, &d.common);

        // Glyphs are built at the clamped size; the remainder is a scale.
        if requested > base {
            object.scale_to_height(requested);
        }
        object
    }

    /// Finish an image once its pixels are available.
    #[must_use]
    pub fn finish_image(&self, d: &ImageDescriptor, pixels: ImagePixels) -> SceneObject {
        let filters = image_filters(d);
        let mut object = SceneObject::new(ObjectKind::Image(ImageObject {
            src: d.url.clone(),
            natural_width: pixels.width,
            natural_height: pixels.height,
            filters,
            pixels: Some(pixels),
        }));
        self.apply_common(&mut object, &d.common);
        if let Some(width) = d.width.filter(|w| *w > 0.0) {
            object.scale_to_width(width);
        }
        object
    }

    /// Finish a background texture: stretched over the canvas, beneath and
    /// behind everything, never selectable.
    #[must_use]
    pub fn finish_texture(
        &self,
        texture: &Texture,
        pixels: ImagePixels,
        width: u32,
        height: u32,
    ) -> SceneObject {
        let scale_x = f64::from(width) / f64::from(pixels.width.max(1));
        let scale_y = f64::from(height) / f64::from(pixels.height.max(1));
        let mut object = SceneObject::new(ObjectKind::Image(ImageObject {
            src: texture.url.clone(),
            natural_width: pixels.width,
            natural_height: pixels.height,
            filters: Vec::new(),
            pixels: Some(pixels),
        }));
        object.placement.scale_x = scale_x;
        object.placement.scale_y = scale_y;
        object.opacity = texture
            .opacity
            .map_or(self.defaults.opacity, |o| o.clamp(0.0, 1.0));
        object.blend_mode = texture
            .blend_mode
            .as_deref()
            .and_then(crate::element::BlendMode::parse)
            .unwrap_or_default();
        object.selectable = false;
        object
    }

    fn shape_fill(&self, gradient: Option<&Gradient>, fill: Option<&str>) -> Paint {
        if let Some(gradient) = gradient.and_then(Gradient::normalized) {
            return Paint::Gradient(gradient);
        }
        Paint::Color(fill.map_or_else(|| self.defaults.shape_fill.clone(), str::to_string))
    }

    fn apply_common(&self, object: &mut SceneObject, common: &CommonProps) {
        object.placement = placement(common);
        object.opacity = common
            .opacity
            .map_or(self.defaults.opacity, |o| o.clamp(0.0, 1.0));
        object.selectable = common.selectable.unwrap_or(self.defaults.selectable);
        object.blend_mode = common.blend_mode.unwrap_or_default();

        // Secondary passes.
        if let Some(shadow) = &common.shadow {
            object.shadow = Some(self.shadow(shadow));
        }
        if let Some(stroke) = common.stroke.as_ref().filter(|s| !s.is_empty()) {
            object.stroke = Some(stroke.clone());
            object.stroke_width = common.stroke_width.unwrap_or(self.defaults.stroke_width);
        }
    }

    fn shadow(&self, d: &ShadowDescriptor) -> Shadow {
        let base = self.defaults.shadow();
        Shadow {
            color: d.color.clone().unwrap_or(base.color),
            blur: d.blur.unwrap_or(base.blur),
            offset_x: d.offset_x.unwrap_or(base.offset_x),
            offset_y: d.offset_y.unwrap_or(base.offset_y),
        }
    }
}

fn placement(common: &CommonProps) -> Placement {
    Placement {
        left: common.left.unwrap_or(0.0),
        top: common.top.unwrap_or(0.0),
        origin_x: common.origin_x.unwrap_or_default(),
        origin_y: common.origin_y.unwrap_or_default(),
        angle: common.angle.unwrap_or(0.0),
        scale_x: common.scale_x.unwrap_or(1.0),
        scale_y: common.scale_y.unwrap_or(1.0),
        skew_x: common.skew_x.unwrap_or(0.0),
        skew_y: common.skew_y.unwrap_or(0.0),
    }
}

fn image_filters(d: &ImageDescriptor) -> Vec<ImageFilter> {
    let active = |v: Option<f64>| v.filter(|v| v.is_finite() && v.abs() > f64::EPSILON);
    let mut filters = Vec::new();
    if let Some(blur) = active(d.filters.blur) {
        filters.push(ImageFilter::Blur(blur));
    }
    if let Some(brightness) = active(d.filters.brightness) {
        filters.push(ImageFilter::Brightness(brightness));
    }
    if let Some(contrast) = active(d.filters.contrast) {
        filters.push(ImageFilter::Contrast(contrast));
    }
    filters
}
