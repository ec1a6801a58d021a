//! Fallback values applied when a descriptor leaves a field unspecified.

use crate::element::Shadow;

/// The single table of element fallback values.
///
/// Every default the materializer applies is read from here, once, at
/// materialization entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDefaults {
    /// Text fill when neither `fill` nor `color` is given.
    pub text_fill: String,
    /// Text font family.
    pub font_family: String,
    /// Text font weight.
    pub font_weight: String,
    /// Text font style.
    pub font_style: String,
    /// Requested font size when none is given.
    pub font_size: f64,
    /// Largest nominal font size a text primitive is created with.
    pub font_size_clamp: f64,
    /// Circle radius.
    pub circle_radius: f64,
    /// Rect and circle fill.
    pub shape_fill: String,
    /// Shadow color when a shadow omits it.
    pub shadow_color: String,
    /// Shadow blur when a shadow omits it.
    pub shadow_blur: f64,
    /// Shadow horizontal offset.
    pub shadow_offset_x: f64,
    /// Shadow vertical offset.
    pub shadow_offset_y: f64,
    /// Opacity.
    pub opacity: f64,
    /// Whether elements are selectable.
    pub selectable: bool,
    /// Stroke width when none is given.
    pub stroke_width: f64,
}

impl Default for ElementDefaults {
    fn default() -> Self {
        Self {
            text_fill: "#000000".to_string(),
            font_family: "Arial".to_string(),
            font_weight: "normal".to_string(),
            font_style: "normal".to_string(),
            font_size: 40.0,
            font_size_clamp: 80.0,
            circle_radius: 50.0,
            shape_fill: "transparent".to_string(),
            shadow_color: "rgba(0,0,0,0.5)".to_string(),
            shadow_blur: 10.0,
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
            opacity: 1.0,
            selectable: true,
            stroke_width: 0.0,
        }
    }
}

impl ElementDefaults {
    /// Shadow with every field at its default.
    #[must_use]
    pub fn shadow(&self) -> Shadow {
        Shadow {
            color: self.shadow_color.clone(),
            blur: self.shadow_blur,
            offset_x: self.shadow_offset_x,
            offset_y: self.shadow_offset_y,
        }
    }

    /// Nominal size a text primitive is created with.
    #[must_use]
    pub fn base_font_size(&self, requested: f64) -> f64 {
        requested.min(self.font_size_clamp)
    }
}
