//! Layout documents: one [`LayoutConfig`] per output format, bundled in an
//! [`AiResponse`].
//!
//! ## Example
//!
//! ```json
//! {
//!   "instagram_story": {
//!     "width": 1080, "height": 1920,
//!     "backgroundColor": "#509E66",
//!     "elements": [
//!       { "type": "text", "content": "STORY MODE", "top": 100, "left": 540,
//!         "originX": "center", "fontSize": 100, "color": "white" }
//!     ]
//!   },
//!   "instagram_post": { "width": 1080, "height": 1080, "elements": [] },
//!   "facebook_ad": { "width": 1200, "height": 628, "elements": [] }
//! }
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

use crate::descriptor::{lenient, ElementDescriptor};
use crate::element::{Gradient, Paint};
use crate::CanvasResult;

/// Background used when a layout declares neither a gradient nor a color.
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// Full-canvas image drawn beneath every element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Texture {
    /// Source URL or data URI.
    pub url: String,
    /// Opacity in `[0, 1]`.
    #[serde(default)]
    pub opacity: Option<f64>,
    /// Compositing operation name.
    #[serde(default)]
    pub blend_mode: Option<String>,
}

/// One output variant of a design.
///
/// Only the canvas size is required. Optional fields of the wrong shape
/// read as absent, so one bad texture or gradient never loses the layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Canvas width in pixels.
    #[serde(deserialize_with = "dimension")]
    pub width: u32,
    /// Canvas height in pixels.
    #[serde(deserialize_with = "dimension")]
    pub height: u32,
    /// Solid background color.
    #[serde(default, deserialize_with = "lenient")]
    pub background_color: Option<String>,
    /// Gradient background; wins over `background_color`.
    #[serde(default, deserialize_with = "lenient")]
    pub background_gradient: Option<Gradient>,
    /// Optional background texture.
    #[serde(default, deserialize_with = "lenient")]
    pub texture: Option<Texture>,
    /// Elements in render order (later entries draw on top).
    #[serde(default, deserialize_with = "element_list")]
    pub elements: Vec<ElementDescriptor>,
}

/// Canvas dimension: a non-negative integer, also accepted as an integral float.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn dimension<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).map_err(|_| D::Error::custom(format!("dimension {n} out of range")));
    }
    match value.as_f64() {
        Some(f) if f.fract().abs() < f64::EPSILON && (0.0..=f64::from(u32::MAX)).contains(&f) => {
            Ok(f as u32)
        }
        _ => Err(D::Error::custom(format!("invalid canvas dimension {value}"))),
    }
}

/// Element array; `null` or a non-array reads as no elements.
fn element_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<ElementDescriptor>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items.into_iter().map(ElementDescriptor::from_value).collect()),
        Value::Null => Ok(Vec::new()),
        other => {
            tracing::debug!(elements = %other, "Ignoring non-array element list");
            Ok(Vec::new())
        }
    }
}

impl LayoutConfig {
    /// Empty layout of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background_color: None,
            background_gradient: None,
            texture: None,
            elements: Vec::new(),
        }
    }

    /// Parse a layout from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the document itself is not a layout. Individual
    /// malformed elements never fail parsing.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolved background paint: gradient, then solid color, then white.
    #[must_use]
    pub fn background(&self) -> Paint {
        if let Some(gradient) = self.background_gradient.as_ref().and_then(Gradient::normalized)
        {
            return Paint::Gradient(gradient);
        }
        Paint::Color(
            self.background_color
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string()),
        )
    }

    /// Number of elements that will be materialized.
    #[must_use]
    pub fn valid_element_count(&self) -> usize {
        self.elements.iter().filter(|e| !e.is_invalid()).count()
    }
}

/// Named output formats with fixed canvas sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutFormat {
    /// Vertical social story, 1080×1920.
    Story,
    /// Square social post, 1080×1080.
    Post,
    /// Landscape banner ad, 1200×628.
    Banner,
}

impl LayoutFormat {
    /// All formats.
    pub const ALL: [Self; 3] = [Self::Story, Self::Post, Self::Banner];

    /// Canvas size of this format.
    #[must_use]
    pub const fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Story => (1080, 1920),
            Self::Post => (1080, 1080),
            Self::Banner => (1200, 628),
        }
    }

    /// Format whose size exactly equals `(width, height)`.
    #[must_use]
    pub fn from_dimensions(width: u32, height: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.dimensions() == (width, height))
    }

    /// Parse a format name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "story" | "instagram_story" => Some(Self::Story),
            "post" | "instagram_post" => Some(Self::Post),
            "banner" | "facebook_ad" => Some(Self::Banner),
            _ => None,
        }
    }
}

impl std::fmt::Display for LayoutFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Story => "story",
            Self::Post => "post",
            Self::Banner => "banner",
        };
        f.write_str(name)
    }
}

/// A generated design: exactly one layout per format.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AiResponse {
    /// Story layout.
    #[serde(rename = "instagram_story", alias = "story")]
    pub story: LayoutConfig,
    /// Post layout.
    #[serde(rename = "instagram_post", alias = "post")]
    pub post: LayoutConfig,
    /// Banner layout.
    #[serde(rename = "facebook_ad", alias = "banner")]
    pub banner: LayoutConfig,
}

impl AiResponse {
    /// Parse a design from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the three layouts is missing or not a layout.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Layout for a format.
    #[must_use]
    pub fn layout(&self, format: LayoutFormat) -> &LayoutConfig {
        match format {
            LayoutFormat::Story => &self.story,
            LayoutFormat::Post => &self.post,
            LayoutFormat::Banner => &self.banner,
        }
    }

    /// Layout whose format size exactly equals the canvas size.
    #[must_use]
    pub fn select(&self, width: u32, height: u32) -> Option<(LayoutFormat, &LayoutConfig)> {
        LayoutFormat::from_dimensions(width, height).map(|f| (f, self.layout(f)))
    }
}

const FALLBACK_PRODUCT_URL: &str =
    "https://png.pngtree.com/png-clipart/20240901/original/pngtree-sports-shoes-png-image_15910407.png";

fn fallback_layout(
    format: LayoutFormat,
    headline: &str,
    headline_top: f64,
    headline_size: f64,
    product_width: f64,
    product_angle: f64,
) -> LayoutConfig {
    let (width, height) = format.dimensions();
    let center_x = f64::from(width) / 2.0;
    let center_y = f64::from(height) / 2.0;
    let product_top = if format == LayoutFormat::Story {
        900.0
    } else {
        center_y
    };
    LayoutConfig {
        background_color: Some("#509E66".to_string()),
        elements: vec![
            ElementDescriptor::from_value(json!({
                "type": "text",
                "content": headline,
                "top": headline_top,
                "left": center_x,
                "originX": "center",
                "fontSize": headline_size,
                "color": "white"
            })),
            ElementDescriptor::from_value(json!({
                "type": "image",
                "url": FALLBACK_PRODUCT_URL,
                "top": product_top,
                "left": center_x,
                "originX": "center",
                "originY": "center",
                "width": product_width,
                "angle": product_angle
            })),
        ],
        ..LayoutConfig::new(width, height)
    }
}

/// Fixed three-format campaign used when generation is unavailable.
#[must_use]
pub fn fallback_campaign() -> AiResponse {
    AiResponse {
        story: fallback_layout(LayoutFormat::Story, "STORY MODE", 100.0, 100.0, 900.0, -15.0),
        post: fallback_layout(LayoutFormat::Post, "SQUARE POST", 100.0, 80.0, 700.0, 0.0),
        banner: fallback_layout(LayoutFormat::Banner, "LANDSCAPE AD", 50.0, 60.0, 500.0, -10.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::GradientKind;

    #[test]
    fn test_parse_layout_with_malformed_elements() {
        let json = r##"{
            "width": 1080,
            "height": 1920,
            "backgroundColor": "#101010",
            "somethingElse": null,
            "elements": [
                { "type": "text" },
                { "type": "rect", "width": 100, "height": 50 },
                { "type": "hexagon" },
                42
            ]
        }"##;
        let layout = LayoutConfig::from_json(json).expect("should parse");
        assert_eq!(layout.elements.len(), 4);
        assert_eq!(layout.valid_element_count(), 1);
        assert_eq!(layout.background(), Paint::Color("#101010".to_string()));
    }

    #[test]
    fn test_background_precedence() {
        let mut layout = LayoutConfig::new(100, 100);
        assert_eq!(layout.background(), Paint::Color(DEFAULT_BACKGROUND.to_string()));

        layout.background_color = Some("#123456".to_string());
        layout.background_gradient = Some(Gradient {
            kind: GradientKind::Linear,
            coords: crate::element::GradientCoords::default(),
            stops: Vec::new(),
        });
        // A gradient without stops falls back to the solid color.
        assert_eq!(layout.background(), Paint::Color("#123456".to_string()));

        let json = r##"{
            "width": 1080, "height": 1080,
            "backgroundColor": "#123456",
            "backgroundGradient": {
                "type": "linear",
                "coords": { "x1": 0, "y1": 0, "x2": 0, "y2": 1080 },
                "stops": [ { "offset": 0, "color": "#000" }, { "offset": 1, "color": "#fff" } ]
            }
        }"##;
        let layout = LayoutConfig::from_json(json).expect("parse");
        assert!(matches!(layout.background(), Paint::Gradient(_)));
    }

    #[test]
    fn test_unusable_gradient_and_texture_read_as_absent() {
        let json = r##"{
            "width": 1080, "height": 1080,
            "backgroundColor": "#123456",
            "backgroundGradient": { "type": "conic", "stops": [] },
            "texture": { "opacity": 0.3 },
            "elements": [ { "type": "rect", "width": 10, "height": 10 } ]
        }"##;
        let layout = LayoutConfig::from_json(json).expect("layout survives");
        assert!(layout.background_gradient.is_none());
        assert!(layout.texture.is_none());
        assert_eq!(layout.background(), Paint::Color("#123456".to_string()));
        assert_eq!(layout.valid_element_count(), 1);
    }

    #[test]
    fn test_integral_float_dimensions_and_null_elements() {
        let layout = LayoutConfig::from_json(r#"{ "width": 1080.0, "height": 1920, "elements": null }"#)
            .expect("parse");
        assert_eq!((layout.width, layout.height), (1080, 1920));
        assert!(layout.elements.is_empty());

        assert!(LayoutConfig::from_json(r#"{ "width": 1080.5, "height": 1920 }"#).is_err());
        assert!(LayoutConfig::from_json(r#"{ "width": -1, "height": 1920 }"#).is_err());
        assert!(LayoutConfig::from_json(r#"{ "height": 1920 }"#).is_err());
    }

    #[test]
    fn test_bad_banner_texture_keeps_whole_response() {
        let json = r##"{
            "instagram_story": { "width": 1080, "height": 1920, "elements": [] },
            "instagram_post": { "width": 1080, "height": 1080, "backgroundColor": "#509E66" },
            "facebook_ad": {
                "width": 1200, "height": 628,
                "texture": { "opacity": 0.4, "blendMode": "multiply" },
                "elements": [ { "type": "text", "content": "LANDSCAPE AD" } ]
            }
        }"##;
        let response = AiResponse::from_json(json).expect("design survives");
        assert!(response.banner.texture.is_none());
        assert_eq!(response.banner.valid_element_count(), 1);
        assert_eq!(
            response.post.background(),
            Paint::Color("#509E66".to_string())
        );
    }

    #[test]
    fn test_format_dimensions() {
        assert_eq!(LayoutFormat::from_dimensions(1080, 1920), Some(LayoutFormat::Story));
        assert_eq!(LayoutFormat::from_dimensions(1080, 1080), Some(LayoutFormat::Post));
        assert_eq!(LayoutFormat::from_dimensions(1200, 628), Some(LayoutFormat::Banner));
        assert_eq!(LayoutFormat::from_dimensions(1920, 1080), None);
        assert_eq!(LayoutFormat::parse("facebook_ad"), Some(LayoutFormat::Banner));
    }

    #[test]
    fn test_parse_response_with_wire_keys() {
        let json = r#"{
            "instagram_story": { "width": 1080, "height": 1920, "elements": [] },
            "instagram_post": { "width": 1080, "height": 1080, "elements": [] },
            "facebook_ad": { "width": 1200, "height": 628, "elements": [] }
        }"#;
        let response = AiResponse::from_json(json).expect("parse");
        let (format, layout) = response.select(1200, 628).expect("banner matches");
        assert_eq!(format, LayoutFormat::Banner);
        assert_eq!(layout.width, 1200);
        assert!(response.select(800, 600).is_none());
    }

    #[test]
    fn test_response_missing_slot_is_error() {
        let json = r#"{ "instagram_story": { "width": 1080, "height": 1920 } }"#;
        assert!(AiResponse::from_json(json).is_err());
    }

    #[test]
    fn test_fallback_campaign_is_complete() {
        let campaign = fallback_campaign();
        for format in LayoutFormat::ALL {
            let layout = campaign.layout(format);
            assert_eq!((layout.width, layout.height), format.dimensions());
            assert_eq!(layout.valid_element_count(), 2);
        }
    }
}
