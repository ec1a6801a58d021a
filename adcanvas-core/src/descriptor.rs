//! Declarative element descriptors, as emitted by layout generation.
//!
//! Generated layouts are imperfect: unknown `type` tags, missing required
//! fields, stray `null`s and extra keys all occur. Parsing never fails for a
//! single element; anything unusable becomes [`ElementDescriptor::Invalid`]
//! with the reason attached, and the materializer skips it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::element::{BlendMode, Gradient, TextAlign};
use crate::geometry::{OriginX, OriginY};

/// Why an element descriptor cannot be materialized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    /// The descriptor has no `type` tag.
    #[error("missing element type")]
    MissingType,
    /// The `type` tag names no known element kind.
    #[error("unknown element type `{0}`")]
    UnknownType(String),
    /// A text element without content.
    #[error("text element has no content")]
    MissingContent,
    /// An image element without a URL.
    #[error("image element has no url")]
    MissingUrl,
    /// The descriptor is not a JSON object.
    #[error("malformed element: {0}")]
    Malformed(String),
}

/// Optional drop shadow parameters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowDescriptor {
    /// CSS color.
    #[serde(default)]
    pub color: Option<String>,
    /// Blur radius.
    #[serde(default)]
    pub blur: Option<f64>,
    /// Horizontal offset.
    #[serde(default)]
    pub offset_x: Option<f64>,
    /// Vertical offset.
    #[serde(default)]
    pub offset_y: Option<f64>,
}

/// Image filter parameters; each filter is active only when set to a
/// non-default value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FilterDescriptor {
    /// Blur strength.
    #[serde(default)]
    pub blur: Option<f64>,
    /// Brightness adjustment.
    #[serde(default)]
    pub brightness: Option<f64>,
    /// Contrast adjustment.
    #[serde(default)]
    pub contrast: Option<f64>,
}

/// Positional and visual envelope shared by every element kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommonProps {
    /// Anchor Y.
    pub top: Option<f64>,
    /// Anchor X.
    pub left: Option<f64>,
    /// Horizontal anchor.
    pub origin_x: Option<OriginX>,
    /// Vertical anchor.
    pub origin_y: Option<OriginY>,
    /// Rotation in degrees.
    pub angle: Option<f64>,
    /// Opacity in `[0, 1]`.
    pub opacity: Option<f64>,
    /// Whether the user may select the element.
    pub selectable: Option<bool>,
    /// Drop shadow.
    pub shadow: Option<ShadowDescriptor>,
    /// Horizontal skew in degrees.
    pub skew_x: Option<f64>,
    /// Vertical skew in degrees.
    pub skew_y: Option<f64>,
    /// Horizontal scale.
    pub scale_x: Option<f64>,
    /// Vertical scale.
    pub scale_y: Option<f64>,
    /// Stroke color.
    pub stroke: Option<String>,
    /// Stroke width.
    pub stroke_width: Option<f64>,
    /// Compositing operation.
    pub blend_mode: Option<BlendMode>,
}

/// A rectangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RectDescriptor {
    /// Shared envelope.
    pub common: CommonProps,
    /// Width.
    pub width: Option<f64>,
    /// Height.
    pub height: Option<f64>,
    /// Solid fill.
    pub fill: Option<String>,
    /// Gradient fill; wins over `fill`.
    pub gradient: Option<Gradient>,
    /// Horizontal corner radius.
    pub rx: Option<f64>,
    /// Vertical corner radius.
    pub ry: Option<f64>,
}

/// A circle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CircleDescriptor {
    /// Shared envelope.
    pub common: CommonProps,
    /// Radius.
    pub radius: Option<f64>,
    /// Solid fill.
    pub fill: Option<String>,
    /// Gradient fill; wins over `fill`.
    pub gradient: Option<Gradient>,
}

/// A text run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextDescriptor {
    /// Shared envelope.
    pub common: CommonProps,
    /// Text content. Never empty.
    pub content: String,
    /// Requested rendered font size.
    pub font_size: Option<f64>,
    /// Font family.
    pub font_family: Option<String>,
    /// CSS font weight.
    pub font_weight: Option<String>,
    /// CSS font style.
    pub font_style: Option<String>,
    /// Fill color; wins over `color`.
    pub fill: Option<String>,
    /// Fallback text color.
    pub color: Option<String>,
    /// Character spacing in thousandths of an em.
    pub char_spacing: Option<f64>,
    /// Horizontal alignment.
    pub text_align: Option<TextAlign>,
}

/// A raster image fetched from a URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageDescriptor {
    /// Shared envelope.
    pub common: CommonProps,
    /// Source URL or data URI. Never empty.
    pub url: String,
    /// Target rendered width; the aspect ratio is kept.
    pub width: Option<f64>,
    /// Filter parameters.
    pub filters: FilterDescriptor,
}

/// A descriptor that will not be materialized.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidElement {
    /// The declared `type` tag, if any.
    pub element_type: Option<String>,
    /// Why it is skipped.
    pub reason: SkipReason,
}

/// One declarative element of a layout.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementDescriptor {
    /// `"type": "rect"`.
    Rect(RectDescriptor),
    /// `"type": "circle"`.
    Circle(CircleDescriptor),
    /// `"type": "text"`.
    Text(TextDescriptor),
    /// `"type": "image"`.
    Image(ImageDescriptor),
    /// Anything that cannot be materialized.
    Invalid(InvalidElement),
}

/// Read an optional field, treating a value of the wrong shape as absent.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring malformed optional field");
            Ok(None)
        }
    }
}

/// Wire shape of an element: every field optional, unknown keys ignored,
/// wrong-shaped values read as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawElement {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    top: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    left: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    origin_x: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    origin_y: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    angle: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    opacity: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    selectable: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    shadow: Option<ShadowDescriptor>,
    #[serde(default, deserialize_with = "lenient")]
    skew_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    skew_y: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    scale_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    scale_y: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    stroke: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    stroke_width: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    blend_mode: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    width: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    height: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    fill: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    gradient: Option<Gradient>,
    #[serde(default, deserialize_with = "lenient")]
    rx: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    ry: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    radius: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    content: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    font_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    font_family: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    font_weight: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    font_style: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    color: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    char_spacing: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    text_align: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    filters: Option<FilterDescriptor>,
}

impl RawElement {
    fn common(&self) -> CommonProps {
        CommonProps {
            top: self.top,
            left: self.left,
            origin_x: self.origin_x.as_deref().and_then(OriginX::parse),
            origin_y: self.origin_y.as_deref().and_then(OriginY::parse),
            angle: self.angle,
            opacity: self.opacity,
            selectable: self.selectable,
            shadow: self.shadow.clone(),
            skew_x: self.skew_x,
            skew_y: self.skew_y,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            stroke: self.stroke.clone(),
            stroke_width: self.stroke_width,
            blend_mode: self.blend_mode.as_deref().and_then(BlendMode::parse),
        }
    }

    fn font_weight(&self) -> Option<String> {
        match self.font_weight.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl ElementDescriptor {
    /// Resolve a JSON value into a descriptor. Never fails.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let declared = value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string);
        match serde_json::from_value::<RawElement>(value) {
            Ok(raw) => Self::from_raw(raw),
            Err(e) => Self::invalid(declared, SkipReason::Malformed(e.to_string())),
        }
    }

    fn invalid(element_type: Option<String>, reason: SkipReason) -> Self {
        Self::Invalid(InvalidElement {
            element_type,
            reason,
        })
    }

    fn from_raw(raw: RawElement) -> Self {
        let common = raw.common();
        let Some(kind) = raw.kind.clone() else {
            return Self::invalid(None, SkipReason::MissingType);
        };
        match kind.as_str() {
            "rect" => Self::Rect(RectDescriptor {
                common,
                width: raw.width,
                height: raw.height,
                fill: raw.fill,
                gradient: raw.gradient,
                rx: raw.rx,
                ry: raw.ry,
            }),
            "circle" => Self::Circle(CircleDescriptor {
                common,
                radius: raw.radius,
                fill: raw.fill,
                gradient: raw.gradient,
            }),
            "text" => match raw.content.as_deref() {
                Some(content) if !content.is_empty() => Self::Text(TextDescriptor {
                    common,
                    content: content.to_string(),
                    font_size: raw.font_size,
                    font_weight: raw.font_weight(),
                    font_family: raw.font_family,
                    font_style: raw.font_style,
                    fill: raw.fill,
                    color: raw.color,
                    char_spacing: raw.char_spacing,
                    text_align: raw.text_align.as_deref().and_then(TextAlign::parse),
                }),
                _ => Self::invalid(Some(kind), SkipReason::MissingContent),
            },
            "image" => match raw.url.as_deref() {
                Some(url) if !url.is_empty() => Self::Image(ImageDescriptor {
                    common,
                    url: url.to_string(),
                    width: raw.width,
                    filters: raw.filters.unwrap_or_default(),
                }),
                _ => Self::invalid(Some(kind), SkipReason::MissingUrl),
            },
            other => Self::invalid(
                Some(other.to_string()),
                SkipReason::UnknownType(other.to_string()),
            ),
        }
    }

    /// Element type tag, as declared.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Rect(_) => Some("rect"),
            Self::Circle(_) => Some("circle"),
            Self::Text(_) => Some("text"),
            Self::Image(_) => Some("image"),
            Self::Invalid(invalid) => invalid.element_type.as_deref(),
        }
    }

    /// Shared envelope, for materializable descriptors.
    #[must_use]
    pub fn common(&self) -> Option<&CommonProps> {
        match self {
            Self::Rect(d) => Some(&d.common),
            Self::Circle(d) => Some(&d.common),
            Self::Text(d) => Some(&d.common),
            Self::Image(d) => Some(&d.common),
            Self::Invalid(_) => None,
        }
    }

    /// Whether this descriptor will be skipped.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

impl<'de> Deserialize<'de> for ElementDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rect_with_defaults_absent() {
        let d = ElementDescriptor::from_value(json!({
            "type": "rect", "top": 10, "left": 20, "width": 100, "height": 50
        }));
        let ElementDescriptor::Rect(rect) = d else {
            panic!("expected rect");
        };
        assert_eq!(rect.width, Some(100.0));
        assert_eq!(rect.common.top, Some(10.0));
        assert!(rect.common.origin_x.is_none());
        assert!(rect.fill.is_none());
    }

    #[test]
    fn test_text_without_content_is_invalid() {
        let d = ElementDescriptor::from_value(json!({ "type": "text", "fontSize": 40 }));
        assert_eq!(
            d,
            ElementDescriptor::Invalid(InvalidElement {
                element_type: Some("text".to_string()),
                reason: SkipReason::MissingContent,
            })
        );

        let empty = ElementDescriptor::from_value(json!({ "type": "text", "content": "" }));
        assert!(empty.is_invalid());
    }

    #[test]
    fn test_image_without_url_is_invalid() {
        let d = ElementDescriptor::from_value(json!({ "type": "image", "width": 300 }));
        assert!(matches!(
            d,
            ElementDescriptor::Invalid(InvalidElement {
                reason: SkipReason::MissingUrl,
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_and_missing_type() {
        let unknown = ElementDescriptor::from_value(json!({ "type": "triangle" }));
        assert_eq!(unknown.type_name(), Some("triangle"));
        assert!(matches!(
            unknown,
            ElementDescriptor::Invalid(InvalidElement {
                reason: SkipReason::UnknownType(_),
                ..
            })
        ));

        let untyped = ElementDescriptor::from_value(json!({ "top": 1 }));
        assert!(matches!(
            untyped,
            ElementDescriptor::Invalid(InvalidElement {
                reason: SkipReason::MissingType,
                ..
            })
        ));
    }

    #[test]
    fn test_wrong_shape_optional_fields_read_as_absent() {
        let shadowed = ElementDescriptor::from_value(json!({
            "type": "text", "content": "SUMMER SALE", "shadow": "0 4px 10px rgba(0,0,0,0.5)"
        }));
        let ElementDescriptor::Text(text) = shadowed else {
            panic!("expected text");
        };
        assert_eq!(text.content, "SUMMER SALE");
        assert!(text.common.shadow.is_none());

        let faded = ElementDescriptor::from_value(json!({
            "type": "text", "content": "New range", "opacity": "0.9", "fontSize": 64
        }));
        let ElementDescriptor::Text(text) = faded else {
            panic!("expected text");
        };
        assert!(text.common.opacity.is_none());
        assert_eq!(text.font_size, Some(64.0));

        let image = ElementDescriptor::from_value(json!({
            "type": "image", "url": "a.png", "filters": [1, 2], "gradient": "red"
        }));
        assert!(matches!(image, ElementDescriptor::Image(_)));
    }

    #[test]
    fn test_wrong_shape_required_field_still_skips() {
        let d = ElementDescriptor::from_value(json!({ "type": "text", "content": 42 }));
        assert!(matches!(
            d,
            ElementDescriptor::Invalid(InvalidElement {
                reason: SkipReason::MissingContent,
                ..
            })
        ));

        let not_an_object = ElementDescriptor::from_value(json!("rect"));
        assert!(matches!(
            not_an_object,
            ElementDescriptor::Invalid(InvalidElement {
                reason: SkipReason::Malformed(_),
                ..
            })
        ));
    }

    #[test]
    fn test_nulls_and_extra_keys_are_unspecified() {
        let d = ElementDescriptor::from_value(json!({
            "type": "text",
            "content": "Hello",
            "fill": null,
            "color": "white",
            "glowRadius": 12,
            "originX": "center",
            "originY": "middle",
            "fontWeight": 700,
            "blendMode": "multiply"
        }));
        let ElementDescriptor::Text(text) = d else {
            panic!("expected text");
        };
        assert!(text.fill.is_none());
        assert_eq!(text.color.as_deref(), Some("white"));
        assert_eq!(text.common.origin_x, Some(OriginX::Center));
        assert!(text.common.origin_y.is_none());
        assert_eq!(text.font_weight.as_deref(), Some("700"));
        assert_eq!(text.common.blend_mode, Some(BlendMode::Multiply));
    }

    #[test]
    fn test_image_filters_parse() {
        let d = ElementDescriptor::from_value(json!({
            "type": "image", "url": "bg.jpg", "filters": { "blur": 0.4, "contrast": 0 }
        }));
        let ElementDescriptor::Image(image) = d else {
            panic!("expected image");
        };
        assert_eq!(image.filters.blur, Some(0.4));
        assert_eq!(image.filters.contrast, Some(0.0));
        assert!(image.filters.brightness.is_none());
    }
}
