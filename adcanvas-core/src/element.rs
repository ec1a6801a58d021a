//! Scene objects - the materialized, mutable building blocks of a scene.

use std::sync::Arc;

use kurbo::Rect;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Placement;

/// Height of one text line relative to the font size.
pub const FONT_SIZE_MULT: f64 = 1.13;
/// Spacing between consecutive text lines, relative to one line.
pub const LINE_HEIGHT: f64 = 1.16;
/// Average glyph advance relative to the font size.
pub const AVG_ADVANCE: f64 = 0.6;

/// Unique identifier for a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new unique object ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gradient geometry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    /// Linear gradient between two points.
    Linear,
    /// Radial gradient between two circles.
    Radial,
}

/// Gradient coordinate frame, in the painted object's units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GradientCoords {
    /// Start X.
    #[serde(default)]
    pub x1: f64,
    /// Start Y.
    #[serde(default)]
    pub y1: f64,
    /// End X.
    #[serde(default)]
    pub x2: f64,
    /// End Y.
    #[serde(default)]
    pub y2: f64,
    /// Inner radius (radial only).
    #[serde(default)]
    pub r1: Option<f64>,
    /// Outer radius (radial only).
    #[serde(default)]
    pub r2: Option<f64>,
}

/// One color stop of a gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position along the gradient in `[0, 1]`.
    pub offset: f64,
    /// CSS color.
    pub color: String,
}

/// A linear or radial gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    /// Gradient type.
    #[serde(rename = "type")]
    pub kind: GradientKind,
    /// Coordinate frame.
    #[serde(default)]
    pub coords: GradientCoords,
    /// Ordered color stops.
    #[serde(default)]
    pub stops: Vec<ColorStop>,
}

impl Gradient {
    /// Whether offsets lie in `[0, 1]` and never decrease.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.stops
            .iter()
            .all(|s| (0.0..=1.0).contains(&s.offset))
            && self.stops.windows(2).all(|w| w[0].offset <= w[1].offset)
    }

    /// Copy with offsets clamped to `[0, 1]` and stably sorted.
    ///
    /// Returns `None` if the gradient has no stops to paint.
    #[must_use]
    pub fn normalized(&self) -> Option<Self> {
        if self.stops.is_empty() {
            return None;
        }
        let mut stops: Vec<ColorStop> = self
            .stops
            .iter()
            .map(|s| ColorStop {
                offset: if s.offset.is_nan() {
                    0.0
                } else {
                    s.offset.clamp(0.0, 1.0)
                },
                color: s.color.clone(),
            })
            .collect();
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Some(Self {
            kind: self.kind,
            coords: self.coords,
            stops,
        })
    }
}

/// Fill paint of an object or background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Paint {
    /// A solid CSS color.
    Color(String),
    /// A gradient.
    Gradient(Gradient),
}

impl Paint {
    /// The solid color, if this paint is one.
    #[must_use]
    pub fn as_color(&self) -> Option<&str> {
        match self {
            Self::Color(c) => Some(c),
            Self::Gradient(_) => None,
        }
    }
}

/// Drop shadow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    /// CSS color.
    pub color: String,
    /// Blur radius.
    pub blur: f64,
    /// Horizontal offset.
    pub offset_x: f64,
    /// Vertical offset.
    pub offset_y: f64,
}

/// Compositing operation used when drawing an object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Normal painting.
    #[default]
    SourceOver,
    /// Multiply.
    Multiply,
    /// Screen.
    Screen,
    /// Overlay.
    Overlay,
    /// Darken.
    Darken,
    /// Lighten.
    Lighten,
    /// Color dodge.
    ColorDodge,
    /// Color burn.
    ColorBurn,
    /// Hard light.
    HardLight,
    /// Soft light.
    SoftLight,
    /// Difference.
    Difference,
    /// Exclusion.
    Exclusion,
    /// Hue.
    Hue,
    /// Saturation.
    Saturation,
    /// Color.
    Color,
    /// Luminosity.
    Luminosity,
}

impl BlendMode {
    const ALL: [Self; 16] = [
        Self::SourceOver,
        Self::Multiply,
        Self::Screen,
        Self::Overlay,
        Self::Darken,
        Self::Lighten,
        Self::ColorDodge,
        Self::ColorBurn,
        Self::HardLight,
        Self::SoftLight,
        Self::Difference,
        Self::Exclusion,
        Self::Hue,
        Self::Saturation,
        Self::Color,
        Self::Luminosity,
    ];

    /// CSS / canvas composite operation name.
    #[must_use]
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::SourceOver => "source-over",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::ColorDodge => "color-dodge",
            Self::ColorBurn => "color-burn",
            Self::HardLight => "hard-light",
            Self::SoftLight => "soft-light",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Color => "color",
            Self::Luminosity => "luminosity",
        }
    }

    /// Parse a composite operation name. `normal` is accepted for `source-over`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        if name == "normal" {
            return Some(Self::SourceOver);
        }
        Self::ALL.into_iter().find(|m| m.css_name() == name)
    }
}

/// One entry of an image's active filter chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ImageFilter {
    /// Blur strength in `[0, 1]`.
    Blur(f64),
    /// Brightness adjustment in `[-1, 1]`.
    Brightness(f64),
    /// Contrast adjustment in `[-1, 1]`.
    Contrast(f64),
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Left aligned.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
    /// Justified.
    Justify,
}

impl TextAlign {
    /// Parse an alignment name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }
}

/// Which text primitive an object is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextVariant {
    /// Static text.
    #[serde(rename = "text")]
    Text,
    /// In-place editable text.
    #[default]
    #[serde(rename = "i-text")]
    IText,
    /// Wrapped text box.
    #[serde(rename = "textbox")]
    Textbox,
}

/// Text content and typography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextObject {
    /// Text content; lines are separated by `\n`.
    pub content: String,
    /// Nominal font size. Absent on objects loaded from malformed scenes.
    #[serde(default)]
    pub font_size: Option<f64>,
    /// Font family.
    pub font_family: String,
    /// CSS font weight.
    pub font_weight: String,
    /// CSS font style.
    pub font_style: String,
    /// Extra spacing between characters, in thousandths of an em.
    pub char_spacing: f64,
    /// Horizontal alignment.
    pub text_align: TextAlign,
    /// Text primitive.
    pub variant: TextVariant,
}

impl TextObject {
    /// Estimated unscaled `(width, height)` of the laid-out text.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn measure(&self) -> (f64, f64) {
        let font_size = self.font_size.unwrap_or(0.0);
        let lines: Vec<&str> = self.content.split('\n').collect();
        let width = lines
            .iter()
            .map(|line| {
                let chars = line.chars().count() as f64;
                let spacing = (chars - 1.0).max(0.0) * self.char_spacing / 1000.0 * font_size;
                chars * font_size * AVG_ADVANCE + spacing
            })
            .fold(0.0, f64::max);
        let line_count = lines.len() as f64;
        let height = font_size * FONT_SIZE_MULT * ((line_count - 1.0) * LINE_HEIGHT + 1.0);
        (width, height)
    }
}

/// Decoded image pixels shared between scene objects and exporters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePixels {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Straight-alpha RGBA8 pixel data.
    pub rgba: Arc<[u8]>,
}

impl ImagePixels {
    /// Image filled with a single color.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let data: Vec<u8> = std::iter::repeat(rgba).take(count).flatten().collect();
        Self {
            width,
            height,
            rgba: data.into(),
        }
    }
}

/// Image source and filter chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageObject {
    /// Source URL or data URI.
    pub src: String,
    /// Natural width in pixels.
    pub natural_width: u32,
    /// Natural height in pixels.
    pub natural_height: u32,
    /// Active filters, applied in order.
    #[serde(default)]
    pub filters: Vec<ImageFilter>,
    /// Decoded pixels, when available.
    #[serde(skip)]
    pub pixels: Option<ImagePixels>,
}

/// Straight line segment, in object-local units from the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineObject {
    /// Start X.
    pub x1: f64,
    /// Start Y.
    pub y1: f64,
    /// End X.
    pub x2: f64,
    /// End Y.
    pub y2: f64,
    /// Dash pattern; empty for a solid line.
    #[serde(default)]
    pub dash: Vec<f64>,
}

/// The kind of primitive a scene object draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectKind {
    /// Rectangle with optional rounded corners.
    Rect {
        /// Width.
        width: f64,
        /// Height.
        height: f64,
        /// Horizontal corner radius.
        rx: f64,
        /// Vertical corner radius.
        ry: f64,
    },
    /// Circle.
    Circle {
        /// Radius.
        radius: f64,
    },
    /// Text.
    Text(TextObject),
    /// Raster image.
    Image(ImageObject),
    /// Line segment.
    Line(LineObject),
}

/// A materialized object in the scene, with content, paint and placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneObject {
    /// Unique identifier.
    pub id: ObjectId,
    /// Object content.
    pub kind: ObjectKind,
    /// Anchored position, rotation, scale and skew.
    pub placement: Placement,
    /// Fill paint.
    pub fill: Option<Paint>,
    /// Stroke color.
    pub stroke: Option<String>,
    /// Stroke width.
    pub stroke_width: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Drop shadow.
    pub shadow: Option<Shadow>,
    /// Compositing operation.
    pub blend_mode: BlendMode,
    /// Whether the user can select this object.
    pub selectable: bool,
    /// Editor-only guide; never validated, highlighted or exported.
    #[serde(default)]
    pub guide: bool,
    /// Declaration index within the layout that produced this object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_slot: Option<usize>,
}

impl SceneObject {
    /// Create a new object of the given kind at the canvas origin.
    #[must_use]
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            id: ObjectId::new(),
            kind,
            placement: Placement::default(),
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            opacity: 1.0,
            shadow: None,
            blend_mode: BlendMode::SourceOver,
            selectable: true,
            guide: false,
            layout_slot: None,
        }
    }

    /// Set the placement.
    #[must_use]
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the fill paint.
    #[must_use]
    pub fn with_fill(mut self, fill: Paint) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Unscaled `(width, height)` of the object's content.
    #[must_use]
    pub fn intrinsic_size(&self) -> (f64, f64) {
        match &self.kind {
            ObjectKind::Rect { width, height, .. } => (*width, *height),
            ObjectKind::Circle { radius } => (radius * 2.0, radius * 2.0),
            ObjectKind::Text(text) => text.measure(),
            ObjectKind::Image(image) => (
                f64::from(image.natural_width),
                f64::from(image.natural_height),
            ),
            ObjectKind::Line(line) => ((line.x2 - line.x1).abs(), (line.y2 - line.y1).abs()),
        }
    }

    /// Axis-aligned bounding box in logical canvas units.
    #[must_use]
    pub fn bounding_box(&self) -> Rect {
        let (width, height) = self.intrinsic_size();
        self.placement.bounding_box(width, height)
    }

    /// Whether this object belongs to the text family.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, ObjectKind::Text(_))
    }

    /// Text typography, if this is a text object.
    #[must_use]
    pub fn text(&self) -> Option<&TextObject> {
        match &self.kind {
            ObjectKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Uniformly scale so the bounding box is `value` units tall.
    ///
    /// Objects with no measurable height are left untouched.
    pub fn scale_to_height(&mut self, value: f64) {
        let (width, height) = self.intrinsic_size();
        if let Some(scale) = self.placement.uniform_scale_for_height(width, height, value) {
            self.placement = self.placement.with_scale(scale);
        }
    }

    /// Uniformly scale so the bounding box is `value` units wide.
    ///
    /// Objects with no measurable width are left untouched.
    pub fn scale_to_width(&mut self, value: f64) {
        let (width, height) = self.intrinsic_size();
        if let Some(scale) = self.placement.uniform_scale_for_width(width, height, value) {
            self.placement = self.placement.with_scale(scale);
        }
    }

    /// Replace the content of a text object. The anchor is preserved.
    ///
    /// Returns `false` if this is not a text object.
    pub fn set_text(&mut self, content: impl Into<String>) -> bool {
        match &mut self.kind {
            ObjectKind::Text(text) => {
                text.content = content.into();
                true
            }
            _ => false,
        }
    }
}
