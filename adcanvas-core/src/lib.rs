//! # Ad Canvas Core
//!
//! Layout rendering and brand-rule validation for ad creatives.
//! Performs no I/O; images enter through the [`ImageLoader`] trait.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    adcanvas-core                    │
//! ├─────────────────────────────────────────────────────┤
//! │  AiResponse ─► FormatSelector ─► LayoutRenderer     │
//! │                                   │                 │
//! │                          Materializer ─► Scene      │
//! ├─────────────────────────────────────────────────────┤
//! │  Scene ─► validate_canvas ─► mark_validation_errors │
//! │  headline ─► check_copy                             │
//! └─────────────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod copy;
pub mod defaults;
pub mod descriptor;
pub mod editor;
pub mod element;
pub mod error;
pub mod format;
pub mod geometry;
pub mod guides;
pub mod layout;
pub mod loader;
pub mod marker;
pub mod materialize;
pub mod platform;
pub mod render;
pub mod scene;
pub mod validation;

pub use copy::{check_copy, check_copy_all, validate_copy, CopyCategory, CopyViolation};
pub use defaults::ElementDefaults;
pub use descriptor::{ElementDescriptor, SkipReason};
pub use editor::{Editor, FormatRender};
pub use element::{
    BlendMode, Gradient, GradientKind, ImageFilter, ImagePixels, ObjectId, ObjectKind, Paint,
    SceneObject, Shadow,
};
pub use error::{CanvasError, CanvasResult};
pub use format::FormatSelector;
pub use geometry::{OriginX, OriginY, Placement, Viewport};
pub use guides::{draw_safe_zone_guides, place_safe_zone_guides};
pub use layout::{fallback_campaign, AiResponse, LayoutConfig, LayoutFormat, Texture};
pub use loader::{CrossOrigin, ImageLoader, ImageRequest, MemoryLoader};
pub use marker::mark_validation_errors;
pub use materialize::{Materialized, Materializer};
pub use platform::{CanvasPreset, Platform, CANVAS_PRESETS};
pub use render::{LayoutRenderer, PendingRender, RenderReport, SettledRender};
pub use scene::Scene;
pub use validation::{validate_canvas, ValidationError, ViolationKind};

/// Ad canvas core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
