//! Target platforms and their rule thresholds.

use serde::{Deserialize, Serialize};

/// Top margin, in logical units, that content must stay below.
pub const SAFE_ZONE_TOP: f64 = 10.0;
/// Bottom margin, in logical units, that content must stay above.
pub const SAFE_ZONE_BOTTOM: f64 = 20.0;

/// A named output context with its own size and rule thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Platform {
    /// Vertical social story.
    Social,
    /// Square social post.
    InstagramPost,
    /// Landscape banner ad.
    FacebookAd,
}

impl Platform {
    /// All platforms.
    pub const ALL: [Self; 3] = [Self::Social, Self::InstagramPost, Self::FacebookAd];

    /// Required canvas size.
    #[must_use]
    pub const fn canvas_size(self) -> (u32, u32) {
        match self {
            Self::Social => (1080, 1920),
            Self::InstagramPost => (1080, 1080),
            Self::FacebookAd => (1200, 628),
        }
    }

    /// Smallest allowed text font size.
    #[must_use]
    pub const fn min_font_size(self) -> f64 {
        match self {
            Self::Social => 20.0,
            Self::InstagramPost => 12.0,
            Self::FacebookAd => 10.0,
        }
    }

    /// Whether the canvas size and safe zones are checked.
    #[must_use]
    pub const fn enforces_layout_rules(self) -> bool {
        matches!(self, Self::Social)
    }

    /// Parse a platform name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "social" | "story" => Some(Self::Social),
            "instagramPost" | "instagram_post" | "post" => Some(Self::InstagramPost),
            "facebookAd" | "facebook_ad" | "banner" => Some(Self::FacebookAd),
            _ => None,
        }
    }
}

/// A named canvas size offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CanvasPreset {
    /// Display name.
    pub name: &'static str,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Sizes the user can pick from.
pub const CANVAS_PRESETS: [CanvasPreset; 3] = [
    CanvasPreset {
        name: "Instagram Story",
        width: 1080,
        height: 1920,
    },
    CanvasPreset {
        name: "Instagram Post",
        width: 1080,
        height: 1080,
    },
    CanvasPreset {
        name: "Facebook Ad",
        width: 1200,
        height: 628,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutFormat;

    #[test]
    fn test_only_social_enforces_layout_rules() {
        assert!(Platform::Social.enforces_layout_rules());
        assert!(!Platform::InstagramPost.enforces_layout_rules());
        assert!(!Platform::FacebookAd.enforces_layout_rules());
    }

    #[test]
    fn test_presets_match_formats() {
        for preset in CANVAS_PRESETS {
            assert!(LayoutFormat::from_dimensions(preset.width, preset.height).is_some());
        }
        assert_eq!(Platform::parse("instagramPost"), Some(Platform::InstagramPost));
    }
}
